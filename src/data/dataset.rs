use super::collate::collate_pair;
use super::error::Error;
use super::{Batch, Sample};
use crate::chem;
use crate::featurize::{self, FeaturizerConfig};
use crate::io;
use ndarray::{Array1, Array2, Axis};
use tracing::{debug, trace};

/// InChI strings paired with a label matrix and a validity mask.
///
/// Samples are built on demand by [`get`](Self::get); nothing is cached, so
/// every call parses and featurizes again.
#[derive(Debug, Clone)]
pub struct GraphData {
    inchis: Vec<String>,
    labels: Array2<f32>,
    mask: Array2<bool>,
    config: FeaturizerConfig,
}

impl GraphData {
    /// # Errors
    ///
    /// - [`Error::LengthMismatch`] if there is not one label row per InChI.
    /// - [`Error::MaskShape`] if the mask shape differs from the labels.
    pub fn new<S: Into<String>>(
        inchis: impl IntoIterator<Item = S>,
        labels: Array2<f32>,
        mask: Array2<bool>,
    ) -> Result<Self, Error> {
        let inchis: Vec<String> = inchis.into_iter().map(Into::into).collect();
        if inchis.len() != labels.nrows() {
            return Err(Error::LengthMismatch {
                inchis: inchis.len(),
                labels: labels.nrows(),
            });
        }
        if mask.dim() != labels.dim() {
            return Err(Error::MaskShape {
                labels: labels.dim(),
                mask: mask.dim(),
            });
        }
        debug!(
            samples = inchis.len(),
            tasks = labels.ncols(),
            "created graph dataset"
        );
        Ok(Self {
            inchis,
            labels,
            mask,
            config: FeaturizerConfig::default(),
        })
    }

    /// One label per InChI, all of them valid.
    pub fn single_task<S: Into<String>>(
        inchis: impl IntoIterator<Item = S>,
        labels: Array1<f32>,
    ) -> Result<Self, Error> {
        let labels = labels.insert_axis(Axis(1));
        let mask = Array2::from_elem(labels.dim(), true);
        Self::new(inchis, labels, mask)
    }

    /// Replaces the featurizer settings used by [`get`](Self::get).
    pub fn with_config(mut self, config: FeaturizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &FeaturizerConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.inchis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inchis.is_empty()
    }

    /// Number of label columns.
    pub fn num_tasks(&self) -> usize {
        self.labels.ncols()
    }

    pub fn inchi(&self, index: usize) -> Option<&str> {
        self.inchis.get(index).map(String::as_str)
    }

    /// Parses InChI `index`, makes its hydrogens explicit and featurizes it.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] for a bad index, [`Error::Io`] if the InChI
    /// cannot be read and [`Error::Featurize`] if the molecule cannot be
    /// encoded.
    pub fn get(&self, index: usize) -> Result<Sample, Error> {
        let inchi = self.inchi(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: self.len(),
        })?;
        let parsed = io::parse_inchi(inchi).map_err(|source| Error::Io { index, source })?;
        let mut mol = chem::add_hydrogens(&parsed);
        let graph = featurize::mol_to_graph(&mut mol, &self.config)
            .map_err(|source| Error::Featurize { index, source })?;
        let global_features = featurize::global_features(&mol);
        trace!(index, nodes = graph.num_nodes(), "built sample");

        Ok(Sample {
            graph,
            global_features,
            labels: self.labels.row(index).to_owned(),
            mask: self.mask.row(index).to_owned(),
        })
    }

    /// Consecutive mini-batches of at most `batch_size` samples, in dataset
    /// order. The last batch holds the remainder.
    ///
    /// # Errors
    ///
    /// [`Error::BatchSize`] if `batch_size` is zero.
    pub fn batches(&self, batch_size: usize) -> Result<Batches<'_>, Error> {
        if batch_size == 0 {
            return Err(Error::BatchSize);
        }
        Ok(Batches {
            data: self,
            batch_size,
            next: 0,
        })
    }
}

/// Iterator returned by [`GraphData::batches`].
#[derive(Debug)]
pub struct Batches<'a> {
    data: &'a GraphData,
    batch_size: usize,
    next: usize,
}

impl Iterator for Batches<'_> {
    type Item = Result<Batch, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.data.len() {
            return None;
        }
        let end = (self.next + self.batch_size).min(self.data.len());
        let range = self.next..end;
        self.next = end;
        Some(
            range
                .map(|i| self.data.get(i))
                .collect::<Result<Vec<_>, _>>()
                .and_then(collate_pair),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.data.len().saturating_sub(self.next).div_ceil(self.batch_size);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Batches<'_> {}
