use thiserror::Error;

/// Errors raised while turning a molecule into a graph.
#[derive(Debug, Error)]
pub enum Error {
    /// The atom's element is not in the atom type vocabulary.
    #[error("atom type '{0}' is not in the featurizer vocabulary")]
    UnknownAtomType(String),

    /// Partial charges could not be computed.
    #[error("chemistry perception failed: {0}")]
    Chem(#[from] crate::chem::Error),

    #[error("graph construction failed: {0}")]
    Graph(#[from] crate::graph::Error),
}
