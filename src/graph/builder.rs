use super::{Error, MolGraph};
use ndarray::{Array2, ArrayView1};

/// Incremental construction of a [`MolGraph`] into storage sized up front.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    features: Array2<f32>,
    rows: usize,
    src: Vec<usize>,
    dst: Vec<usize>,
}

impl GraphBuilder {
    /// Reserves room for exactly `num_nodes` feature rows of `feature_dim`
    /// values and for `num_edges` edges.
    pub fn with_capacity(num_nodes: usize, num_edges: usize, feature_dim: usize) -> Self {
        Self {
            features: Array2::zeros((num_nodes, feature_dim)),
            rows: 0,
            src: Vec::with_capacity(num_edges),
            dst: Vec::with_capacity(num_edges),
        }
    }

    /// Appends a node and returns its index.
    ///
    /// # Errors
    ///
    /// [`Error::FeatureWidth`] for a row of the wrong width and
    /// [`Error::FeatureRows`] when every reserved row is already filled.
    pub fn push_node(&mut self, features: ArrayView1<'_, f32>) -> Result<usize, Error> {
        let (capacity, width) = self.features.dim();
        if features.len() != width {
            return Err(Error::FeatureWidth {
                expected: width,
                found: features.len(),
            });
        }
        if self.rows == capacity {
            return Err(Error::FeatureRows {
                expected: capacity,
                found: capacity + 1,
            });
        }
        self.features.row_mut(self.rows).assign(&features);
        self.rows += 1;
        Ok(self.rows - 1)
    }

    /// Appends a directed edge. Endpoints are checked in [`build`](Self::build).
    pub fn push_edge(&mut self, src: usize, dst: usize) {
        self.src.push(src);
        self.dst.push(dst);
    }

    pub fn num_edges(&self) -> usize {
        self.src.len()
    }

    /// # Errors
    ///
    /// [`Error::FeatureRows`] if fewer nodes were pushed than reserved and
    /// [`Error::EdgeOutOfBounds`] for an edge to a missing node.
    pub fn build(self) -> Result<MolGraph, Error> {
        let capacity = self.features.nrows();
        if self.rows != capacity {
            return Err(Error::FeatureRows {
                expected: capacity,
                found: self.rows,
            });
        }
        for (edge, (&s, &d)) in self.src.iter().zip(&self.dst).enumerate() {
            if s >= capacity || d >= capacity {
                return Err(Error::EdgeOutOfBounds {
                    edge,
                    src: s,
                    dst: d,
                    num_nodes: capacity,
                });
            }
        }
        Ok(MolGraph::from_parts(self.src, self.dst, self.features))
    }
}
