//! Dataset adapter.
//!
//! [`GraphData`] pairs InChI strings with labels and a mask and turns each
//! entry into a [`Sample`]; [`collate_pair`] merges samples into a
//! [`Batch`] for the model.

mod collate;
mod dataset;
mod error;

pub use collate::collate_pair;
pub use dataset::{Batches, GraphData};
pub use error::Error;

use crate::featurize::GLOBAL_FEATURE_DIM;
use crate::graph::{BatchedGraph, MolGraph};
use ndarray::{Array1, Array2};

/// One featurized molecule with its labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub graph: MolGraph,
    pub global_features: [f32; GLOBAL_FEATURE_DIM],
    pub labels: Array1<f32>,
    /// `true` where the label is present.
    pub mask: Array1<bool>,
}

/// Samples merged for one forward pass. Every matrix has one row per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub graph: BatchedGraph,
    pub global_features: Array2<f32>,
    pub labels: Array2<f32>,
    pub mask: Array2<bool>,
}

impl Batch {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.labels.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
