use super::error::Error;
use super::{Batch, Sample};
use crate::featurize::GLOBAL_FEATURE_DIM;
use crate::graph::BatchedGraph;
use ndarray::{Array2, aview1};

/// Merges samples into one [`Batch`], keeping sample order in every row
/// dimension.
///
/// # Errors
///
/// - [`Error::EmptyBatch`] for no samples.
/// - [`Error::LabelWidth`] if a label or mask row differs in width from the
///   first sample's labels.
/// - [`Error::Graph`] if the graphs do not share a feature width.
pub fn collate_pair(samples: Vec<Sample>) -> Result<Batch, Error> {
    let Some(first) = samples.first() else {
        return Err(Error::EmptyBatch);
    };
    let width = first.labels.len();
    for (sample, s) in samples.iter().enumerate() {
        for found in [s.labels.len(), s.mask.len()] {
            if found != width {
                return Err(Error::LabelWidth {
                    sample,
                    expected: width,
                    found,
                });
            }
        }
    }

    let k = samples.len();
    let mut global_features = Array2::zeros((k, GLOBAL_FEATURE_DIM));
    let mut labels = Array2::zeros((k, width));
    let mut mask = Array2::from_elem((k, width), false);
    let mut graphs = Vec::with_capacity(k);

    for (i, s) in samples.into_iter().enumerate() {
        global_features.row_mut(i).assign(&aview1(&s.global_features));
        labels.row_mut(i).assign(&s.labels);
        mask.row_mut(i).assign(&s.mask);
        graphs.push(s.graph);
    }

    Ok(Batch {
        graph: BatchedGraph::batch(&graphs)?,
        global_features,
        labels,
        mask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MolGraph;
    use ndarray::{Array1, array};

    fn sample(nodes: usize, label: f32, masked: bool) -> Sample {
        let edges: Vec<(usize, usize)> = (1..nodes).map(|i| (i - 1, i)).collect();
        Sample {
            graph: MolGraph::new(&edges, Array2::ones((nodes, 3))).unwrap(),
            global_features: [label, 0.0, 0.0, 1.0],
            labels: array![label, -label],
            mask: array![true, !masked],
        }
    }

    #[test]
    fn rows_follow_sample_order() {
        let batch = collate_pair(vec![sample(2, 1.0, false), sample(3, 2.0, true), sample(1, 3.0, false)])
            .unwrap();
        assert_eq!(batch.graph.batch_num_nodes(), &[2, 3, 1]);
        assert_eq!(batch.graph.graph().num_nodes(), 6);
        assert_eq!(batch.graph.graph().num_edges(), 3);
        assert_eq!(batch.global_features.column(0), array![1.0f32, 2.0, 3.0]);
        assert_eq!(batch.labels, array![[1.0f32, -1.0], [2.0, -2.0], [3.0, -3.0]]);
        assert_eq!(batch.mask, array![[true, true], [true, false], [true, true]]);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(collate_pair(Vec::new()), Err(Error::EmptyBatch)));
    }

    #[test]
    fn inconsistent_label_width_is_rejected() {
        let mut odd = sample(2, 1.0, false);
        odd.labels = Array1::zeros(3);
        let err = collate_pair(vec![sample(2, 0.0, false), odd]).unwrap_err();
        assert!(matches!(err, Error::LabelWidth {
            sample: 1,
            expected: 2,
            found: 3
        }));
    }
}
