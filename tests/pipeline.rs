use approx::assert_relative_eq;
use chem_gat::data::Error as DataError;
use chem_gat::{
    ATOM_FEATURE_DIM, BatchedGraph, Element, FeaturizerConfig, Gat, GatConfig, GraphData,
    add_hydrogens, collate_pair, global_features, mol_to_graph, parse_inchi,
};
use ndarray::{Array2, array};

const ETHANOL: &str = "InChI=1S/C2H6O/c1-2-3/h3H,2H2,1H3";
const BENZENE: &str = "InChI=1S/C6H6/c1-2-4-6-5-3-1/h1-6H";
const ACETIC_ACID: &str = "InChI=1S/C2H4O2/c1-2(3)4/h1H3,(H,3,4)";
const METHANE: &str = "InChI=1S/CH4/h1H4";

#[test]
fn ethanol_graph_and_descriptors() {
    let mut mol = add_hydrogens(&parse_inchi(ETHANOL).unwrap());
    let count = |e: Element| mol.atoms.iter().filter(|a| a.element == e).count();
    assert_eq!((count(Element::C), count(Element::O), count(Element::H)), (2, 1, 6));

    let graph = mol_to_graph(&mut mol, &FeaturizerConfig::default()).unwrap();
    assert_eq!(graph.num_nodes(), 9);
    assert_eq!(graph.num_edges(), 8);
    assert_eq!(graph.feature_dim(), ATOM_FEATURE_DIM);

    let features = global_features(&mol);
    assert_relative_eq!(features[0], 46.069, epsilon = 0.01);
    assert_eq!(features, global_features(&mol));
}

#[test]
fn dataset_to_predictions() {
    let labels = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.0, 0.0]];
    let mask = array![[true, true], [true, false], [false, true], [true, true]];
    let data = GraphData::new([ETHANOL, BENZENE, ACETIC_ACID, METHANE], labels, mask).unwrap();

    let model = Gat::new(&GatConfig {
        num_classes: 2,
        seed: Some(3),
        ..Default::default()
    })
    .unwrap();

    let mut seen = 0;
    for batch in data.batches(3).unwrap() {
        let batch = batch.unwrap();
        let out = model.forward(&batch.graph).unwrap();
        assert_eq!(out.dim(), (batch.len(), 2));
        assert_eq!(out, model.forward(&batch.graph).unwrap());
        assert!(out.iter().all(|x| x.is_finite()));

        let loss = chem_gat::gat::masked_mse(out.view(), batch.labels.view(), batch.mask.view()).unwrap();
        assert!(loss.is_finite() && loss >= 0.0);
        seen += batch.len();
    }
    assert_eq!(seen, 4);
}

#[test]
fn collated_batch_matches_parts() {
    let data = GraphData::single_task([ETHANOL, BENZENE], array![0.5, 1.5]).unwrap();
    let samples = vec![data.get(0).unwrap(), data.get(1).unwrap()];
    let nodes: Vec<usize> = samples.iter().map(|s| s.graph.num_nodes()).collect();
    assert_eq!(nodes, vec![9, 12]);

    let batch = collate_pair(samples).unwrap();
    assert_eq!(batch.graph.graph().num_nodes(), 21);
    assert_eq!(batch.graph.batch_num_nodes(), &[9, 12]);
    assert_eq!(batch.labels, array![[0.5f32], [1.5]]);
    assert_eq!(batch.global_features.dim(), (2, 4));
}

#[test]
fn varying_node_counts_share_one_forward() {
    let graphs: Vec<_> = [METHANE, ETHANOL, BENZENE]
        .iter()
        .map(|inchi| {
            let mut mol = add_hydrogens(&parse_inchi(inchi).unwrap());
            mol_to_graph(&mut mol, &FeaturizerConfig::default()).unwrap()
        })
        .collect();
    let model = Gat::new(&GatConfig {
        seed: Some(11),
        ..Default::default()
    })
    .unwrap();
    let out = model.forward(&BatchedGraph::batch(&graphs).unwrap()).unwrap();
    assert_eq!(out.dim(), (3, 1));
}

#[test]
fn missing_label_row_is_rejected() {
    let err = GraphData::new(
        [ETHANOL, BENZENE, METHANE],
        Array2::zeros((2, 1)),
        Array2::from_elem((2, 1), true),
    )
    .unwrap_err();
    assert!(matches!(err, DataError::LengthMismatch { inchis: 3, labels: 2 }));
}
