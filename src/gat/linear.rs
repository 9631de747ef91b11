use super::error::Error;
use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, Uniform};
use serde::{Deserialize, Serialize};

/// Gain for ReLU-family activations.
pub const RELU_GAIN: f32 = std::f32::consts::SQRT_2;

/// Normal samples with the Glorot standard deviation
/// `gain * sqrt(2 / (fan_in + fan_out))`.
pub fn xavier_normal<R: Rng + ?Sized>(
    shape: (usize, usize),
    fan_in: usize,
    fan_out: usize,
    gain: f32,
    rng: &mut R,
) -> Array2<f32> {
    let std = gain * (2.0 / (fan_in + fan_out).max(1) as f32).sqrt();
    Array2::from_shape_simple_fn(shape, || {
        let z: f32 = StandardNormal.sample(rng);
        z * std
    })
}

/// A dense layer `y = x · W + b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linear {
    /// `(in_dim, out_dim)`.
    weight: Array2<f32>,
    bias: Option<Array1<f32>>,
}

impl Linear {
    /// Weights and bias drawn uniformly from `±1/sqrt(in_dim)`.
    pub fn new<R: Rng + ?Sized>(in_dim: usize, out_dim: usize, bias: bool, rng: &mut R) -> Self {
        let bound = 1.0 / (in_dim.max(1) as f32).sqrt();
        let dist = Uniform::new_inclusive(-bound, bound);
        let weight = Array2::from_shape_simple_fn((in_dim, out_dim), || dist.sample(rng));
        let bias = bias.then(|| Array1::from_shape_simple_fn(out_dim, || dist.sample(rng)));
        Self { weight, bias }
    }

    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if the bias length differs from the
    /// weight's output width.
    pub fn from_parts(weight: Array2<f32>, bias: Option<Array1<f32>>) -> Result<Self, Error> {
        let linear = Self { weight, bias };
        linear.check()?;
        Ok(linear)
    }

    pub(crate) fn check(&self) -> Result<(), Error> {
        match &self.bias {
            Some(b) if b.len() != self.out_dim() => Err(Error::dimension("linear bias", self.out_dim(), b.len())),
            _ => Ok(()),
        }
    }

    pub fn in_dim(&self) -> usize {
        self.weight.nrows()
    }

    pub fn out_dim(&self) -> usize {
        self.weight.ncols()
    }

    pub fn weight(&self) -> &Array2<f32> {
        &self.weight
    }

    pub fn bias(&self) -> Option<&Array1<f32>> {
        self.bias.as_ref()
    }

    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `x` is not `in_dim` wide.
    pub fn forward(&self, x: ArrayView2<'_, f32>) -> Result<Array2<f32>, Error> {
        if x.ncols() != self.in_dim() {
            return Err(Error::dimension("linear input", self.in_dim(), x.ncols()));
        }
        let mut y = x.dot(&self.weight);
        if let Some(b) = &self.bias {
            y += b;
        }
        Ok(y)
    }

    pub fn num_parameters(&self) -> usize {
        self.weight.len() + self.bias.as_ref().map_or(0, Array1::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn forward_matches_hand_computation() {
        let lin = Linear::from_parts(array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]], Some(array![0.5, -0.5]))
            .unwrap();
        let y = lin.forward(array![[1.0, 0.0, 1.0], [0.0, 1.0, 0.0]].view()).unwrap();
        assert_eq!(y, array![[6.5f32, 7.5], [3.5, 3.5]]);
        assert_eq!(lin.num_parameters(), 8);
    }

    #[test]
    fn wrong_width_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let lin = Linear::new(4, 2, true, &mut rng);
        let err = lin.forward(Array2::zeros((3, 5)).view()).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 4, found: 5, .. }));
        assert!(Linear::from_parts(Array2::zeros((2, 3)), Some(Array1::zeros(2))).is_err());
    }

    #[test]
    fn init_is_bounded_and_seeded() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let la = Linear::new(16, 8, true, &mut a);
        let lb = Linear::new(16, 8, true, &mut b);
        assert_eq!(la, lb);
        assert!(la.weight().iter().all(|w| w.abs() <= 0.25));
        assert!(la.bias().unwrap().iter().all(|w| w.abs() <= 0.25));
        assert!(Linear::new(3, 3, false, &mut a).bias().is_none());
    }

    #[test]
    fn xavier_spread_is_plausible() {
        let mut rng = StdRng::seed_from_u64(3);
        let w = xavier_normal((200, 200), 200, 200, RELU_GAIN, &mut rng);
        let mean = w.mean().unwrap();
        let std = w.std(0.0);
        assert_relative_eq!(mean, 0.0, epsilon = 0.01);
        assert_relative_eq!(std, RELU_GAIN * (2.0f32 / 400.0).sqrt(), epsilon = 0.01);
    }
}
