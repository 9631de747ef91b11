use super::config::{GatConfig, Pooling};
use super::conv::GatConv;
use super::error::Error;
use super::linear::Linear;
use crate::graph::BatchedGraph;
use ndarray::{Array2, Array3, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Stacked attention layers, a per-graph readout and a linear head.
///
/// The readout pools the output layer's `(heads, num_classes)` node
/// embeddings per graph, averages them over the class axis and maps the
/// resulting `heads` values to `num_classes` outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gat {
    config: GatConfig,
    layers: Vec<GatConv>,
    head: Linear,
}

impl Gat {
    /// # Errors
    ///
    /// [`Error::Config`] if the configuration is invalid.
    pub fn new(config: &GatConfig) -> Result<Self, Error> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let hidden = config.num_hidden;
        let slope = config.negative_slope;
        let act = Some(config.activation);
        let last = config.num_layers;

        let mut layers = Vec::with_capacity(last + 1);
        layers.push(GatConv::new(config.in_dim, hidden, config.heads[0], false, act, slope, &mut rng));
        for l in 1..last {
            let in_dim = hidden * config.heads[l - 1];
            layers.push(GatConv::new(in_dim, hidden, config.heads[l], config.residual, act, slope, &mut rng));
        }
        let in_dim = hidden * config.heads[last - 1];
        layers.push(GatConv::new(in_dim, config.num_classes, config.heads[last], true, None, slope, &mut rng));
        let head = Linear::new(config.heads[last], config.num_classes, true, &mut rng);

        let gat = Self {
            config: config.clone(),
            layers,
            head,
        };
        debug!(
            layers = gat.layers.len(),
            parameters = gat.num_parameters(),
            "built attention network"
        );
        Ok(gat)
    }

    pub fn config(&self) -> &GatConfig {
        &self.config
    }

    /// Hidden layers followed by the output layer.
    pub fn layers(&self) -> &[GatConv] {
        &self.layers
    }

    pub fn head(&self) -> &Linear {
        &self.head
    }

    pub fn num_parameters(&self) -> usize {
        self.layers.iter().map(GatConv::num_parameters).sum::<usize>() + self.head.num_parameters()
    }

    /// Predictions for every graph in the batch, `(batch_size, num_classes)`.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if the node features are not `in_dim`
    /// wide.
    pub fn forward(&self, batch: &BatchedGraph) -> Result<Array2<f32>, Error> {
        let graph = batch.graph();
        let Some((output, hidden)) = self.layers.split_last() else {
            return Err(Error::Config("model has no layers".into()));
        };

        let mut h = graph.node_features().to_owned();
        for (l, layer) in hidden.iter().enumerate() {
            h = layer.forward_flat(graph, h.view())?;
            trace!(layer = l, shape = ?h.dim(), "hidden layer");
        }
        let out = output.forward(graph, h.view())?;
        trace!(shape = ?out.dim(), "output layer");

        let pooled = self.readout(batch, &out);
        self.head.forward(pooled.view())
    }

    /// Attention coefficients of every layer, each `(num_edges, heads)` in
    /// the batch's edge order.
    ///
    /// # Errors
    ///
    /// See [`forward`](Self::forward).
    pub fn attention(&self, batch: &BatchedGraph) -> Result<Vec<Array2<f32>>, Error> {
        let graph = batch.graph();
        let mut h = graph.node_features().to_owned();
        let mut all = Vec::with_capacity(self.layers.len());
        for (l, layer) in self.layers.iter().enumerate() {
            all.push(layer.attention(graph, h.view())?);
            if l + 1 < self.layers.len() {
                h = layer.forward_flat(graph, h.view())?;
            }
        }
        Ok(all)
    }

    /// Pools `(num_nodes, heads, classes)` node outputs per graph, then
    /// averages over classes, giving `(batch_size, heads)`.
    fn readout(&self, batch: &BatchedGraph, out: &Array3<f32>) -> Array2<f32> {
        let (_, heads, classes) = out.dim();
        let mut pooled = Array3::<f32>::zeros((batch.batch_size(), heads, classes));
        for (v, &g) in batch.node_graph().iter().enumerate() {
            let mut slot = pooled.index_axis_mut(Axis(0), g);
            slot += &out.index_axis(Axis(0), v);
        }
        if self.config.pooling == Pooling::Mean {
            for (g, &n) in batch.batch_num_nodes().iter().enumerate() {
                if n > 0 {
                    pooled.index_axis_mut(Axis(0), g).mapv_inplace(|x| x / n as f32);
                }
            }
        }
        pooled.sum_axis(Axis(2)) / classes as f32
    }

    /// # Errors
    ///
    /// [`Error::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restores a model written by [`to_json`](Self::to_json), checking that
    /// the parameter shapes agree with the stored configuration.
    ///
    /// # Errors
    ///
    /// [`Error::Serialization`] for malformed JSON, [`Error::Config`] or
    /// [`Error::DimensionMismatch`] for inconsistent parameters.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let gat: Self = serde_json::from_str(text)?;
        gat.check()?;
        Ok(gat)
    }

    fn check(&self) -> Result<(), Error> {
        let config = &self.config;
        config.validate()?;
        if self.layers.len() != config.num_layers + 1 {
            return Err(Error::Config(format!(
                "expected {} attention layers, found {}",
                config.num_layers + 1,
                self.layers.len()
            )));
        }
        let mut width = config.in_dim;
        for (layer, &heads) in self.layers.iter().zip(&config.heads) {
            layer.check()?;
            if layer.in_dim() != width {
                return Err(Error::dimension("layer input", width, layer.in_dim()));
            }
            if layer.num_heads() != heads {
                return Err(Error::dimension("layer heads", heads, layer.num_heads()));
            }
            width = heads * layer.out_dim();
        }
        self.head.check()?;
        if self.head.in_dim() != config.output_heads() {
            return Err(Error::dimension("readout input", config.output_heads(), self.head.in_dim()));
        }
        if self.head.out_dim() != config.num_classes {
            return Err(Error::dimension("readout output", config.num_classes, self.head.out_dim()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gat::Activation;
    use crate::graph::MolGraph;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn config() -> GatConfig {
        GatConfig {
            in_dim: 3,
            num_hidden: 4,
            num_classes: 2,
            heads: vec![2, 3, 2],
            residual: true,
            seed: Some(17),
            ..Default::default()
        }
    }

    fn triangle() -> MolGraph {
        let feats = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        MolGraph::new(&[(0, 1), (1, 2), (2, 0), (1, 0)], feats).unwrap()
    }

    fn pair() -> MolGraph {
        MolGraph::new(&[(0, 1)], array![[0.5, 0.5, 0.0], [0.0, 0.2, 0.9]]).unwrap()
    }

    #[test]
    fn output_has_one_row_per_graph() {
        let gat = Gat::new(&config()).unwrap();
        let batch = BatchedGraph::batch(&[triangle(), pair(), triangle()]).unwrap();
        let out = gat.forward(&batch).unwrap();
        assert_eq!(out.dim(), (3, 2));
        for (x, y) in out.row(0).iter().zip(out.row(2)) {
            assert_relative_eq!(x, y, epsilon = 1e-6);
        }
        assert!(out.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn empty_graph_maps_to_head_bias() {
        let gat = Gat::new(&config()).unwrap();
        let empty = MolGraph::new(&[], Array2::zeros((0, 3))).unwrap();
        let batch = BatchedGraph::batch(&[pair(), empty]).unwrap();
        let out = gat.forward(&batch).unwrap();
        assert_eq!(out.row(1), gat.head().bias().unwrap());
    }

    #[test]
    fn seeded_models_are_reproducible() {
        let a = Gat::new(&config()).unwrap();
        let b = Gat::new(&config()).unwrap();
        assert_eq!(a, b);
        let batch = BatchedGraph::from(triangle());
        assert_eq!(a.forward(&batch).unwrap(), a.forward(&batch).unwrap());
    }

    #[test]
    fn layer_layout_follows_config() {
        let gat = Gat::new(&config()).unwrap();
        let dims: Vec<_> = gat
            .layers()
            .iter()
            .map(|l| (l.in_dim(), l.num_heads(), l.out_dim()))
            .collect();
        assert_eq!(dims, vec![(3, 2, 4), (8, 3, 4), (12, 2, 2)]);
        assert!(gat.layers()[0].residual().is_none());
        assert!(gat.layers()[1].residual().is_some());
        assert!(gat.layers()[2].residual().is_some());
        assert_eq!(gat.layers()[0].activation(), Some(Activation::Elu));
        assert_eq!(gat.layers()[2].activation(), None);
        assert_eq!((gat.head().in_dim(), gat.head().out_dim()), (2, 2));
    }

    #[test]
    fn default_parameter_count() {
        let gat = Gat::new(&GatConfig { seed: Some(0), ..Default::default() }).unwrap();
        assert_eq!(gat.num_parameters(), 3136 + 4288 + 131 + 2);
    }

    #[test]
    fn wrong_feature_width_is_rejected() {
        let gat = Gat::new(&config()).unwrap();
        let wide = MolGraph::new(&[], Array2::zeros((2, 5))).unwrap();
        let err = gat.forward(&BatchedGraph::from(wide)).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 3, found: 5, .. }));
    }

    #[test]
    fn attention_per_layer() {
        let gat = Gat::new(&config()).unwrap();
        let batch = BatchedGraph::from(triangle());
        let maps = gat.attention(&batch).unwrap();
        let shapes: Vec<_> = maps.iter().map(Array2::dim).collect();
        assert_eq!(shapes, vec![(4, 2), (4, 3), (4, 2)]);
        // node 0 receives edges 2 and 3
        for h in 0..2 {
            assert_relative_eq!(maps[2][[2, h]] + maps[2][[3, h]], 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn mean_pooling_ignores_duplication() {
        let gat = Gat::new(&GatConfig {
            pooling: Pooling::Mean,
            ..config()
        })
        .unwrap();
        let single = BatchedGraph::from(triangle());
        let doubled = BatchedGraph::batch(&[triangle(), triangle()]).unwrap();
        let merged = BatchedGraph::from(doubled.graph().clone());
        let a = gat.forward(&single).unwrap();
        let b = gat.forward(&merged).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-5);
        }
    }

    #[test]
    fn json_round_trip() {
        let gat = Gat::new(&config()).unwrap();
        let restored = Gat::from_json(&gat.to_json().unwrap()).unwrap();
        assert_eq!(restored, gat);
        let batch = BatchedGraph::from(pair());
        assert_eq!(restored.forward(&batch).unwrap(), gat.forward(&batch).unwrap());
    }

    #[test]
    fn inconsistent_json_is_rejected() {
        let mut gat = Gat::new(&config()).unwrap();
        gat.layers.pop();
        let text = gat.to_json().unwrap();
        assert!(matches!(Gat::from_json(&text), Err(Error::Config(_))));
        assert!(matches!(Gat::from_json("{"), Err(Error::Serialization(_))));
    }
}
