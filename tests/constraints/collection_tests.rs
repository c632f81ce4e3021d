//! Tests for the ConstraintCollection and ConstrainedModel

use crate::test_helpers::table_of;
use choice_constraints::constraints::{
    ConstraintCollection, ConstraintConfig, ConstraintError, Mutation, OrderingBound,
    ParametricConstraint,
};
use choice_constraints::error::Error;
use choice_constraints::model::ConstrainedModel;
use choice_constraints::parameters::{Parameter, ParameterTable};
use ndarray::arr1;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn estimation_table() -> ParameterTable {
    let mut table = ParameterTable::new();
    table.add_param("asc_bus", 0.0).unwrap();
    table.add_param("tt_car", -0.05).unwrap();
    table.add_param("tt_bus", -0.03).unwrap();
    table
        .add_param_with_bounds("cost", -0.2, f64::NEG_INFINITY, 0.0)
        .unwrap();
    table.add_param_with_bounds("mu", 0.8, 0.0, 1.0).unwrap();
    table
}

const CONSTRAINTS: [&str; 4] = [
    "tt_car <= tt_bus",
    "tt_car/cost >= 0.1",
    "0.2 <= mu <= 1",
    "asc_bus >= -5",
];

#[test]
fn test_reorder_leaves_values_and_gradients_unchanged() {
    let mut table = estimation_table();
    let mut collection =
        ConstraintCollection::from_constraints(CONSTRAINTS, &table, Default::default()).unwrap();

    let point = [
        ("asc_bus", 0.3),
        ("tt_car", -0.04),
        ("tt_bus", -0.02),
        ("cost", -0.3),
        ("mu", 0.6),
    ];
    let x = table.vector_from(point).unwrap();
    let funs: Vec<f64> = collection.iter().map(|c| c.fun(&x).unwrap()).collect();
    let jacs: Vec<Vec<(String, f64)>> = collection
        .iter()
        .map(|c| {
            let j = c.jac(&x).unwrap();
            table.names().into_iter().zip(j.iter().copied()).collect()
        })
        .collect();

    table.reorder(&["mu", "cost", "asc_bus", "tt_bus", "tt_car"]).unwrap();
    collection.relink(&table).unwrap();

    let x = table.vector_from(point).unwrap();
    for (i, c) in collection.iter().enumerate() {
        assert_eq!(c.fun(&x).unwrap(), funs[i]);

        let j = c.jac(&x).unwrap();
        let mut by_name: Vec<(String, f64)> =
            table.names().into_iter().zip(j.iter().copied()).collect();
        let mut expected = jacs[i].clone();
        by_name.sort_by(|a, b| a.0.cmp(&b.0));
        expected.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(by_name, expected);
    }
}

#[test]
fn test_linear_block_follows_collection_order() {
    let table = estimation_table();
    let collection =
        ConstraintCollection::from_constraints(CONSTRAINTS, &table, Default::default()).unwrap();

    let lc = collection.linear_constraint().unwrap();
    assert_eq!(lc.a.dim(), (4, 5));

    // Row 2 is the fixed bound on mu
    assert_eq!(lc.a.row(2).to_vec(), vec![0.0, 0.0, 0.0, 0.0, 1.0]);
    assert_eq!(lc.lb[2], 0.2);
    assert_eq!(lc.ub[2], 1.0);

    // Row 0 is the ordering
    assert_eq!(lc.a.row(0).to_vec(), vec![0.0, -10.0, 10.0, 0.0, 0.0]);

    // The starting values satisfy every row and every value function
    let x = table.values();
    assert!(lc.is_satisfied(&x, 0.0).unwrap());
    assert!(collection.all_satisfied(&x, 0.0).unwrap());
    for record in collection.nonlinear_constraints().unwrap() {
        assert!(record.value(&x).unwrap() >= 0.0);
        assert_eq!(record.kind.as_str(), "ineq");
    }
}

#[test]
fn test_json_loading() {
    let table = table_of(&["a", "b", "c"]);
    let json = r#"[
        "a <= b",
        {"kind": "ordering", "p_less": "b", "p_more": "c", "scale": 2.0},
        {"kind": "fixed", "p": "c", "maximum": 4.0},
        "b <= a",
        "a <= b"
    ]"#;
    let collection = ConstraintCollection::from_json(json, &table, Default::default()).unwrap();
    assert_eq!(collection.len(), 4);
    assert_eq!(collection[1].scale(), 2.0);
    assert_eq!(collection[2].to_string(), "c <= 4");

    let back = collection.to_json().unwrap();
    let reloaded = ConstraintCollection::from_json(&back, &table, Default::default()).unwrap();
    assert_eq!(reloaded.len(), 4);
    assert!(reloaded.iter().zip(collection.iter()).all(|(a, b)| a == b));

    for bad in ["[true]", "[[\"a <= b\"]]", r#"[{"kind": "equality"}]"#] {
        let err = ConstraintCollection::from_json(bad, &table, Default::default()).unwrap_err();
        assert!(
            matches!(err, Error::Constraint(ConstraintError::InvalidItem { .. })),
            "{}",
            bad
        );
    }
    assert!(matches!(
        ConstraintCollection::from_json("{", &table, Default::default()),
        Err(Error::Json(_))
    ));
}

#[test]
fn test_allow_dupes_config() {
    let table = table_of(&["a", "b"]);
    let config = ConstraintConfig {
        allow_dupes: true,
        ..Default::default()
    };
    let mut collection =
        ConstraintCollection::from_constraints(["a <= b", "a <= b"], &table, config).unwrap();
    assert_eq!(collection.len(), 2);
    assert!(collection.allow_dupes());

    collection.set_allow_dupes(false);
    assert_eq!(
        collection.push(OrderingBound::new("a", "b"), &table).unwrap(),
        Mutation::SkippedDuplicate
    );
    assert_eq!(collection.len(), 2);
}

#[test]
fn test_model_workflow() {
    let mut model = ConstrainedModel::new();
    for (name, value) in [("asc_bus", 0.0), ("tt_car", -0.05), ("tt_bus", -0.03)] {
        model.add_parameter(Parameter::new(name, value)).unwrap();
    }
    model
        .add_parameter(Parameter::with_bounds("cost", -0.2, f64::NEG_INFINITY, 0.0).unwrap())
        .unwrap();
    model.set_constraints(["tt_car <= tt_bus", "tt_car/cost >= 0.1"]).unwrap();
    model.mark_fresh();
    let revision = model.revision();

    // Growing the table relinks and invalidates
    model.add_parameter(Parameter::new("mu", 1.0)).unwrap();
    assert!(model.is_stale());
    assert!(model.revision() > revision);
    assert_eq!(model.linear_constraint().unwrap().n_params(), 5);

    // Referenced parameters cannot be removed
    assert!(model.remove_parameter("cost").is_err());
    model.remove_constraint(1).unwrap();
    model.remove_parameter("cost").unwrap();
    assert_eq!(model.parameters().len(), 4);

    // Seeded rescaling is reproducible
    let mut other = model.clone();
    model
        .rescale_constraints(None, None, &mut ChaCha8Rng::seed_from_u64(3))
        .unwrap();
    other
        .rescale_constraints(None, None, &mut ChaCha8Rng::seed_from_u64(3))
        .unwrap();
    assert_eq!(
        model.constraints()[0].scale(),
        other.constraints()[0].scale()
    );

    let x = arr1(&[0.0, -0.05, -0.05, 1.0]);
    let notes = model.binding_constraints(&x).unwrap();
    assert_eq!(notes, vec![(0, "tt_car <= tt_bus".to_string())]);
}
