use thiserror::Error;

/// Errors raised by the dataset adapter and the collate function.
#[derive(Debug, Error)]
pub enum Error {
    /// The number of InChI strings differs from the number of label rows.
    #[error("{inchis} InChI strings but {labels} label rows")]
    LengthMismatch { inchis: usize, labels: usize },

    /// The mask does not have the shape of the label matrix.
    #[error("mask shape {mask:?} does not match label shape {labels:?}")]
    MaskShape {
        labels: (usize, usize),
        mask: (usize, usize),
    },

    #[error("sample index {index} is out of bounds for a dataset of {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("cannot collate an empty batch")]
    EmptyBatch,

    /// A sample's label or mask row has a different width from the first
    /// sample's labels.
    #[error("sample {sample} has {found} label columns, expected {expected}")]
    LabelWidth {
        sample: usize,
        expected: usize,
        found: usize,
    },

    #[error("batch size must be at least 1")]
    BatchSize,

    /// The InChI string of a sample could not be read.
    #[error("failed to read InChI of sample {index}: {source}")]
    Io {
        index: usize,
        #[source]
        source: crate::io::Error,
    },

    /// The molecule of a sample could not be featurized.
    #[error("failed to featurize sample {index}: {source}")]
    Featurize {
        index: usize,
        #[source]
        source: crate::featurize::Error,
    },

    #[error("failed to batch graphs: {0}")]
    Graph(#[from] crate::graph::Error),
}
