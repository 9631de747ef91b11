use ndarray::{ArrayBase, DataMut, Dimension};
use serde::{Deserialize, Serialize};

/// Element-wise nonlinearity applied after a hidden attention layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// `x` for positive inputs, `exp(x) - 1` otherwise.
    #[default]
    Elu,
    Relu,
    Tanh,
    Sigmoid,
    Identity,
}

impl Activation {
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Elu => {
                if x > 0.0 {
                    x
                } else {
                    x.exp_m1()
                }
            }
            Activation::Relu => x.max(0.0),
            Activation::Tanh => x.tanh(),
            Activation::Sigmoid => sigmoid(x),
            Activation::Identity => x,
        }
    }

    pub fn apply_inplace<S, D>(self, values: &mut ArrayBase<S, D>)
    where
        S: DataMut<Elem = f32>,
        D: Dimension,
    {
        if self != Activation::Identity {
            values.mapv_inplace(|x| self.apply(x));
        }
    }
}

/// Logistic function, split by sign so that large magnitudes do not overflow.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[inline]
pub fn leaky_relu(x: f32, negative_slope: f32) -> f32 {
    if x >= 0.0 { x } else { negative_slope * x }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn scalar_values() {
        assert_eq!(Activation::Elu.apply(2.0), 2.0);
        assert_relative_eq!(Activation::Elu.apply(-1.0), (-1.0f32).exp() - 1.0, epsilon = 1e-6);
        assert_eq!(Activation::Relu.apply(-3.0), 0.0);
        assert_relative_eq!(Activation::Sigmoid.apply(0.0), 0.5);
        assert_relative_eq!(Activation::Tanh.apply(0.5), 0.5f32.tanh());
        assert_eq!(Activation::Identity.apply(-7.5), -7.5);
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_relative_eq!(sigmoid(100.0), 1.0);
        assert!(sigmoid(-100.0) >= 0.0);
        assert!(sigmoid(-100.0).is_finite());
    }

    #[test]
    fn leaky_relu_scales_negatives() {
        assert_eq!(leaky_relu(3.0, 0.2), 3.0);
        assert_relative_eq!(leaky_relu(-1.0, 0.2), -0.2);
    }

    #[test]
    fn inplace_over_arrays() {
        let mut a = array![[-1.0f32, 2.0], [0.0, -3.0]];
        Activation::Relu.apply_inplace(&mut a);
        assert_eq!(a, array![[0.0, 2.0], [0.0, 0.0]]);
    }

    #[test]
    fn serde_names() {
        let a: Activation = serde_json::from_str("\"relu\"").unwrap();
        assert_eq!(a, Activation::Relu);
        assert!(serde_json::from_str::<Activation>("\"swish\"").is_err());
        assert_eq!(serde_json::to_string(&Activation::Elu).unwrap(), "\"elu\"");
    }
}
