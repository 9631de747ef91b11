use super::activation::{Activation, leaky_relu};
use super::error::Error;
use super::linear::{RELU_GAIN, xavier_normal};
use crate::graph::MolGraph;
use ndarray::{Array1, Array2, Array3, ArrayView2, s};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Skip connection added to the aggregated messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Residual {
    /// Input and output widths agree.
    Identity,
    /// Bias-free `(in_dim, heads * out_dim)` projection.
    Projection(Array2<f32>),
}

/// Multi-head graph attention layer.
///
/// For every edge `u → v` and head `h` the unnormalized score is
/// `LeakyReLU(⟨z_u, a_src⟩ + ⟨z_v, a_dst⟩)` with `z = x · W`. Scores are
/// softmax-normalized over the incoming edges of each destination, and the
/// output of `v` is the attention-weighted sum of its sources' `z`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatConv {
    /// `(in_dim, heads * out_dim)`.
    fc: Array2<f32>,
    /// `(heads, out_dim)`.
    attn_src: Array2<f32>,
    attn_dst: Array2<f32>,
    /// `heads * out_dim`, zero at initialization.
    bias: Array1<f32>,
    residual: Option<Residual>,
    heads: usize,
    out_dim: usize,
    negative_slope: f32,
    activation: Option<Activation>,
}

impl GatConv {
    /// A layer with Glorot-normal weights (gain `sqrt(2)`) and zero bias.
    ///
    /// With `residual` set, the skip connection is an identity when
    /// `in_dim == heads * out_dim` and a learned projection otherwise.
    pub fn new<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        heads: usize,
        residual: bool,
        activation: Option<Activation>,
        negative_slope: f32,
        rng: &mut R,
    ) -> Self {
        let width = heads * out_dim;
        let fc = xavier_normal((in_dim, width), in_dim, width, RELU_GAIN, rng);
        let attn_src = xavier_normal((heads, out_dim), width, out_dim, RELU_GAIN, rng);
        let attn_dst = xavier_normal((heads, out_dim), width, out_dim, RELU_GAIN, rng);
        let residual = residual.then(|| {
            if in_dim == width {
                Residual::Identity
            } else {
                Residual::Projection(xavier_normal((in_dim, width), in_dim, width, RELU_GAIN, rng))
            }
        });
        Self {
            fc,
            attn_src,
            attn_dst,
            bias: Array1::zeros(width),
            residual,
            heads,
            out_dim,
            negative_slope,
            activation,
        }
    }

    pub fn in_dim(&self) -> usize {
        self.fc.nrows()
    }

    /// Per-head output width.
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    pub fn num_heads(&self) -> usize {
        self.heads
    }

    pub fn residual(&self) -> Option<&Residual> {
        self.residual.as_ref()
    }

    pub fn activation(&self) -> Option<Activation> {
        self.activation
    }

    pub fn num_parameters(&self) -> usize {
        let projection = match &self.residual {
            Some(Residual::Projection(w)) => w.len(),
            _ => 0,
        };
        self.fc.len() + self.attn_src.len() + self.attn_dst.len() + self.bias.len() + projection
    }

    /// Output as `(num_nodes, heads, out_dim)`.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `feat` does not have one row per node
    /// or is not `in_dim` wide.
    pub fn forward(&self, graph: &MolGraph, feat: ArrayView2<'_, f32>) -> Result<Array3<f32>, Error> {
        let flat = self.forward_flat(graph, feat)?;
        let d = self.out_dim;
        Ok(Array3::from_shape_fn((flat.nrows(), self.heads, d), |(v, h, j)| {
            flat[[v, h * d + j]]
        }))
    }

    /// Output with heads concatenated, `(num_nodes, heads * out_dim)`.
    ///
    /// # Errors
    ///
    /// See [`forward`](Self::forward).
    pub fn forward_flat(&self, graph: &MolGraph, feat: ArrayView2<'_, f32>) -> Result<Array2<f32>, Error> {
        let z = self.project(graph, feat)?;
        let alpha = self.normalize(graph, &z);
        let d = self.out_dim;

        let mut out = Array2::<f32>::zeros(z.dim());
        for (e, (u, v)) in graph.edges().enumerate() {
            for h in 0..self.heads {
                let cols = h * d..(h + 1) * d;
                let msg = z.slice(s![u, cols.clone()]);
                out.slice_mut(s![v, cols]).scaled_add(alpha[[e, h]], &msg);
            }
        }

        match &self.residual {
            Some(Residual::Identity) => out += &feat,
            Some(Residual::Projection(w)) => out += &feat.dot(w),
            None => {}
        }
        out += &self.bias;
        if let Some(act) = self.activation {
            act.apply_inplace(&mut out);
        }
        Ok(out)
    }

    /// Normalized attention coefficients, `(num_edges, heads)`, in edge-list
    /// order. Coefficients of the in-edges of each node sum to one per head.
    ///
    /// # Errors
    ///
    /// See [`forward`](Self::forward).
    pub fn attention(&self, graph: &MolGraph, feat: ArrayView2<'_, f32>) -> Result<Array2<f32>, Error> {
        let z = self.project(graph, feat)?;
        Ok(self.normalize(graph, &z))
    }

    fn project(&self, graph: &MolGraph, feat: ArrayView2<'_, f32>) -> Result<Array2<f32>, Error> {
        if feat.nrows() != graph.num_nodes() {
            return Err(Error::dimension("node rows", graph.num_nodes(), feat.nrows()));
        }
        if feat.ncols() != self.in_dim() {
            return Err(Error::dimension("node features", self.in_dim(), feat.ncols()));
        }
        Ok(feat.dot(&self.fc))
    }

    /// Per-node, per-head dot products of `z` with an attention vector.
    fn scores(&self, z: &Array2<f32>, attn: &Array2<f32>) -> Array2<f32> {
        let d = self.out_dim;
        Array2::from_shape_fn((z.nrows(), self.heads), |(v, h)| {
            z.slice(s![v, h * d..(h + 1) * d]).dot(&attn.row(h))
        })
    }

    fn normalize(&self, graph: &MolGraph, z: &Array2<f32>) -> Array2<f32> {
        let el = self.scores(z, &self.attn_src);
        let er = self.scores(z, &self.attn_dst);
        let src = graph.src();
        let mut alpha = Array2::<f32>::zeros((graph.num_edges(), self.heads));

        for v in 0..graph.num_nodes() {
            if graph.in_degree(v) == 0 {
                continue;
            }
            let edges = graph.in_edges(v);
            for h in 0..self.heads {
                let logit = |e: usize| leaky_relu(el[[src[e], h]] + er[[v, h]], self.negative_slope);
                let max = edges.iter().map(|&e| logit(e)).fold(f32::NEG_INFINITY, f32::max);
                let mut total = 0.0;
                for &e in edges {
                    let w = (logit(e) - max).exp();
                    alpha[[e, h]] = w;
                    total += w;
                }
                for &e in edges {
                    alpha[[e, h]] /= total;
                }
            }
        }
        alpha
    }

    /// Shape consistency of deserialized parameters.
    pub(crate) fn check(&self) -> Result<(), Error> {
        let width = self.heads * self.out_dim;
        if self.fc.ncols() != width {
            return Err(Error::dimension("attention weight columns", width, self.fc.ncols()));
        }
        for attn in [&self.attn_src, &self.attn_dst] {
            if attn.dim() != (self.heads, self.out_dim) {
                return Err(Error::dimension("attention vector", width, attn.len()));
            }
        }
        if self.bias.len() != width {
            return Err(Error::dimension("attention bias", width, self.bias.len()));
        }
        match &self.residual {
            Some(Residual::Identity) if self.in_dim() != width => {
                Err(Error::dimension("identity residual", self.in_dim(), width))
            }
            Some(Residual::Projection(w)) if w.dim() != self.fc.dim() => {
                Err(Error::dimension("residual projection", self.fc.len(), w.len()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Axis, array};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn star() -> MolGraph {
        // 1, 2 and 3 all point at 0; 4 is isolated.
        let feats = array![
            [1.0, 0.0, 0.5],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 1.0],
            [0.2, 0.0, 0.3],
            [0.0, 0.0, 1.0]
        ];
        MolGraph::new(&[(1, 0), (2, 0), (3, 0), (0, 1)], feats).unwrap()
    }

    fn layer(residual: bool, activation: Option<Activation>) -> GatConv {
        let mut rng = StdRng::seed_from_u64(11);
        GatConv::new(3, 2, 4, residual, activation, 0.2, &mut rng)
    }

    #[test]
    fn attention_is_normalized_per_destination() {
        let g = star();
        let conv = layer(false, None);
        let alpha = conv.attention(&g, g.node_features()).unwrap();
        assert_eq!(alpha.dim(), (4, 4));
        for h in 0..4 {
            let to_zero: f32 = (0..3).map(|e| alpha[[e, h]]).sum();
            assert_relative_eq!(to_zero, 1.0, epsilon = 1e-5);
            assert_relative_eq!(alpha[[3, h]], 1.0, epsilon = 1e-6);
        }
        assert!(alpha.iter().all(|&a| a > 0.0));
    }

    #[test]
    fn matches_hand_computed_single_head() {
        let conv = GatConv {
            fc: array![[1.0]],
            attn_src: array![[1.0]],
            attn_dst: array![[0.0]],
            bias: array![0.0],
            residual: None,
            heads: 1,
            out_dim: 1,
            negative_slope: 0.2,
            activation: None,
        };
        let g = MolGraph::new(&[(0, 2), (1, 2)], array![[1.0], [2.0], [0.0]]).unwrap();
        let out = conv.forward_flat(&g, g.node_features()).unwrap();
        let e = 1.0f32.exp();
        let expected = 1.0 / (1.0 + e) + 2.0 * e / (1.0 + e);
        assert_relative_eq!(out[[2, 0]], expected, epsilon = 1e-6);
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[1, 0]], 0.0);
    }

    #[test]
    fn negative_logits_use_the_slope() {
        let conv = GatConv {
            fc: array![[1.0]],
            attn_src: array![[-1.0]],
            attn_dst: array![[0.0]],
            bias: array![0.0],
            residual: None,
            heads: 1,
            out_dim: 1,
            negative_slope: 0.5,
            activation: None,
        };
        let g = MolGraph::new(&[(0, 2), (1, 2)], array![[1.0], [3.0], [0.0]]).unwrap();
        let alpha = conv.attention(&g, g.node_features()).unwrap();
        // logits -0.5 and -1.5
        let w = (-1.0f32).exp();
        assert_relative_eq!(alpha[[0, 0]], 1.0 / (1.0 + w), epsilon = 1e-6);
        assert_relative_eq!(alpha[[1, 0]], w / (1.0 + w), epsilon = 1e-6);
    }

    #[test]
    fn isolated_nodes_get_only_bias_and_residual() {
        let g = star();
        let out = layer(false, None).forward(&g, g.node_features()).unwrap();
        assert_eq!(out.dim(), (5, 4, 2));
        assert!(out.index_axis(Axis(0), 4).iter().all(|&x| x == 0.0));

        let mut rng = StdRng::seed_from_u64(5);
        let identity = GatConv::new(3, 3, 1, true, None, 0.2, &mut rng);
        assert_eq!(identity.residual(), Some(&Residual::Identity));
        let out = identity.forward_flat(&g, g.node_features()).unwrap();
        assert_eq!(out.row(4), g.node_features().row(4));
    }

    #[test]
    fn projection_residual_when_widths_differ() {
        let conv = layer(true, Some(Activation::Elu));
        assert!(matches!(conv.residual(), Some(Residual::Projection(w)) if w.dim() == (3, 8)));
        assert_eq!(conv.num_parameters(), 24 + 8 + 8 + 8 + 24);
        conv.check().unwrap();
    }

    #[test]
    fn flat_and_headed_outputs_agree() {
        let g = star();
        let conv = layer(false, Some(Activation::Elu));
        let flat = conv.forward_flat(&g, g.node_features()).unwrap();
        let headed = conv.forward(&g, g.node_features()).unwrap();
        assert_eq!(headed[[0, 3, 1]], flat[[0, 7]]);
        assert_eq!(headed[[2, 1, 0]], flat[[2, 2]]);
        assert!(flat.iter().all(|&x| x > -1.0));
    }

    #[test]
    fn wrong_input_shapes_are_rejected() {
        let g = star();
        let conv = layer(false, None);
        let err = conv.forward(&g, Array2::zeros((5, 4)).view()).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 3, found: 4, .. }));
        let err = conv.forward(&g, Array2::zeros((2, 3)).view()).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 5, found: 2, .. }));
    }
}
