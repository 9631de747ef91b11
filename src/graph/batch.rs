use super::{Error, MolGraph};
use ndarray::{Array2, s};

/// Several graphs merged into one disjoint graph.
///
/// Node and edge index spaces are concatenated in input order: the nodes of
/// graph `k` follow those of graphs `0..k`, and its edge endpoints are
/// shifted by the same offset.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchedGraph {
    graph: MolGraph,
    node_graph: Vec<usize>,
    batch_num_nodes: Vec<usize>,
    batch_num_edges: Vec<usize>,
}

impl BatchedGraph {
    /// # Errors
    ///
    /// [`Error::FeatureWidth`] if the graphs do not share a feature width.
    pub fn batch(graphs: &[MolGraph]) -> Result<Self, Error> {
        let width = graphs.first().map_or(0, MolGraph::feature_dim);
        if let Some(bad) = graphs.iter().find(|g| g.feature_dim() != width) {
            return Err(Error::FeatureWidth {
                expected: width,
                found: bad.feature_dim(),
            });
        }

        let total_nodes: usize = graphs.iter().map(MolGraph::num_nodes).sum();
        let total_edges: usize = graphs.iter().map(MolGraph::num_edges).sum();
        let mut features = Array2::zeros((total_nodes, width));
        let mut src = Vec::with_capacity(total_edges);
        let mut dst = Vec::with_capacity(total_edges);
        let mut node_graph = Vec::with_capacity(total_nodes);

        let mut offset = 0;
        for (k, g) in graphs.iter().enumerate() {
            let n = g.num_nodes();
            features
                .slice_mut(s![offset..offset + n, ..])
                .assign(&g.node_features());
            src.extend(g.src().iter().map(|&u| u + offset));
            dst.extend(g.dst().iter().map(|&v| v + offset));
            node_graph.extend(std::iter::repeat_n(k, n));
            offset += n;
        }

        Ok(Self {
            graph: MolGraph::from_parts(src, dst, features),
            node_graph,
            batch_num_nodes: graphs.iter().map(MolGraph::num_nodes).collect(),
            batch_num_edges: graphs.iter().map(MolGraph::num_edges).collect(),
        })
    }

    /// The merged graph.
    pub fn graph(&self) -> &MolGraph {
        &self.graph
    }

    /// Number of graphs in the batch.
    pub fn batch_size(&self) -> usize {
        self.batch_num_nodes.len()
    }

    /// Graph index of every merged node.
    pub fn node_graph(&self) -> &[usize] {
        &self.node_graph
    }

    pub fn batch_num_nodes(&self) -> &[usize] {
        &self.batch_num_nodes
    }

    pub fn batch_num_edges(&self) -> &[usize] {
        &self.batch_num_edges
    }
}

impl From<MolGraph> for BatchedGraph {
    fn from(graph: MolGraph) -> Self {
        let n = graph.num_nodes();
        Self {
            batch_num_nodes: vec![n],
            batch_num_edges: vec![graph.num_edges()],
            node_graph: vec![0; n],
            graph,
        }
    }
}
