use thiserror::Error;

/// Errors raised while building or batching graphs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// An edge endpoint is not a node of the graph.
    #[error("edge {edge} ({src} -> {dst}) references a node outside 0..{num_nodes}")]
    EdgeOutOfBounds {
        /// Position of the edge in the edge list.
        edge: usize,
        src: usize,
        dst: usize,
        num_nodes: usize,
    },

    /// The feature matrix does not have one row per node.
    #[error("expected {expected} node feature rows, found {found}")]
    FeatureRows { expected: usize, found: usize },

    /// A feature row or a batched graph has the wrong feature width.
    #[error("expected node features of width {expected}, found {found}")]
    FeatureWidth { expected: usize, found: usize },
}
