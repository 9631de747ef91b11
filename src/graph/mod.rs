//! Directed graphs with dense node features.
//!
//! A [`MolGraph`] is immutable once built. Edge endpoints are validated at
//! construction, and the incoming edges of every node are indexed so that
//! attention layers can normalize over a destination's in-edges without
//! scanning the whole edge list.
//!
//! - [`GraphBuilder`] fills preallocated node and edge storage.
//! - [`BatchedGraph`] is the disjoint union of several graphs with per-node
//!   graph membership.

mod batch;
mod builder;
mod error;

pub use batch::BatchedGraph;
pub use builder::GraphBuilder;
pub use error::Error;

use ndarray::{Array2, ArrayView2};

#[derive(Debug, Clone, PartialEq)]
pub struct MolGraph {
    src: Vec<usize>,
    dst: Vec<usize>,
    node_features: Array2<f32>,
    /// Edge ids grouped by destination; the in-edges of `v` are
    /// `in_edges[in_offsets[v]..in_offsets[v + 1]]`, in edge-list order.
    in_offsets: Vec<usize>,
    in_edges: Vec<usize>,
}

impl MolGraph {
    /// Builds a graph from an edge list and a `(num_nodes, width)` feature
    /// matrix. The node count is the number of feature rows.
    ///
    /// # Errors
    ///
    /// [`Error::EdgeOutOfBounds`] if any endpoint is not below the node count.
    pub fn new(edges: &[(usize, usize)], node_features: Array2<f32>) -> Result<Self, Error> {
        let num_nodes = node_features.nrows();
        let mut src = Vec::with_capacity(edges.len());
        let mut dst = Vec::with_capacity(edges.len());
        for (edge, &(s, d)) in edges.iter().enumerate() {
            if s >= num_nodes || d >= num_nodes {
                return Err(Error::EdgeOutOfBounds {
                    edge,
                    src: s,
                    dst: d,
                    num_nodes,
                });
            }
            src.push(s);
            dst.push(d);
        }
        Ok(Self::from_parts(src, dst, node_features))
    }

    /// Assembles a graph from endpoints already known to be in range.
    fn from_parts(src: Vec<usize>, dst: Vec<usize>, node_features: Array2<f32>) -> Self {
        let num_nodes = node_features.nrows();
        let mut in_offsets = vec![0; num_nodes + 1];
        for &d in &dst {
            in_offsets[d + 1] += 1;
        }
        for v in 0..num_nodes {
            in_offsets[v + 1] += in_offsets[v];
        }
        let mut cursor = in_offsets.clone();
        let mut in_edges = vec![0; dst.len()];
        for (e, &d) in dst.iter().enumerate() {
            in_edges[cursor[d]] = e;
            cursor[d] += 1;
        }
        Self {
            src,
            dst,
            node_features,
            in_offsets,
            in_edges,
        }
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.node_features.nrows()
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.src.len()
    }

    /// Width of the node feature rows.
    #[inline]
    pub fn feature_dim(&self) -> usize {
        self.node_features.ncols()
    }

    pub fn src(&self) -> &[usize] {
        &self.src
    }

    pub fn dst(&self) -> &[usize] {
        &self.dst
    }

    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.src.iter().copied().zip(self.dst.iter().copied())
    }

    pub fn node_features(&self) -> ArrayView2<'_, f32> {
        self.node_features.view()
    }

    /// Ids of the edges ending at `node`.
    pub fn in_edges(&self, node: usize) -> &[usize] {
        &self.in_edges[self.in_offsets[node]..self.in_offsets[node + 1]]
    }

    pub fn in_degree(&self, node: usize) -> usize {
        self.in_offsets[node + 1] - self.in_offsets[node]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn path() -> MolGraph {
        let feats = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        MolGraph::new(&[(0, 1), (1, 2), (2, 1)], feats).unwrap()
    }

    #[test]
    fn counts_and_accessors() {
        let g = path();
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.num_edges(), 3);
        assert_eq!(g.feature_dim(), 2);
        assert_eq!(g.src(), &[0, 1, 2]);
        assert_eq!(g.dst(), &[1, 2, 1]);
        assert_eq!(g.edges().collect::<Vec<_>>(), vec![(0, 1), (1, 2), (2, 1)]);
    }

    #[test]
    fn in_edges_are_grouped_by_destination() {
        let g = path();
        assert_eq!(g.in_edges(0), &[] as &[usize]);
        assert_eq!(g.in_edges(1), &[0, 2]);
        assert_eq!(g.in_edges(2), &[1]);
        assert_eq!(g.in_degree(1), 2);
    }

    #[test]
    fn out_of_range_edge_is_rejected() {
        let feats = Array2::<f32>::zeros((2, 1));
        let err = MolGraph::new(&[(0, 1), (1, 2)], feats).unwrap_err();
        assert_eq!(err, Error::EdgeOutOfBounds {
            edge: 1,
            src: 1,
            dst: 2,
            num_nodes: 2,
        });
    }

    #[test]
    fn empty_graph_is_valid() {
        let g = MolGraph::new(&[], Array2::zeros((0, 4))).unwrap();
        assert_eq!(g.num_nodes(), 0);
        assert_eq!(g.num_edges(), 0);
        assert_eq!(g.feature_dim(), 4);
    }
}
