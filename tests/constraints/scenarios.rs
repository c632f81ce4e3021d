//! Worked constraint scenarios
//!
//! Each test follows one constraint from its textual form through linking,
//! evaluation and the linear form handed to a linear solver.

use crate::test_helpers::{ratio_table, table_of};
use approx::assert_relative_eq;
use choice_constraints::constraints::{
    interpret, Constraint, ConstraintCollection, ConstraintError, FixedBound, OrderingBound,
    ParametricConstraint, RatioBound,
};
use choice_constraints::parameters::ParameterTable;
use ndarray::arr1;

#[test]
fn test_two_sided_fixed_bound() {
    let mut c = interpret("-3 <= Param1 <= 3").unwrap();
    assert_eq!(
        c,
        Constraint::from(FixedBound::new("Param1", Some(-3.0), Some(3.0)))
    );

    c.link(&table_of(&["Param0", "Param1"]), None).unwrap();
    assert_relative_eq!(c.fun(&arr1(&[9.0, 0.0])).unwrap(), 30.0);
    assert_relative_eq!(c.fun(&arr1(&[9.0, 2.5])).unwrap(), 5.0);
    assert!(c.fun(&arr1(&[9.0, -4.0])).unwrap() < 0.0);

    // Upper side binds near the top
    assert_eq!(c.jac(&arr1(&[0.0, 2.5])).unwrap(), arr1(&[0.0, -10.0]));
    assert_eq!(c.jac(&arr1(&[0.0, -2.5])).unwrap(), arr1(&[0.0, 10.0]));

    let lc = c.linear_form().unwrap();
    assert_eq!(lc.a.row(0).to_vec(), vec![0.0, 1.0]);
    assert_eq!(lc.lb.to_vec(), vec![-3.0]);
    assert_eq!(lc.ub.to_vec(), vec![3.0]);
}

#[test]
fn test_ordering_sign() {
    let mut c = interpret("ParamA <= ParamB").unwrap();
    assert_eq!(c, Constraint::from(OrderingBound::new("ParamA", "ParamB")));

    c.link(&table_of(&["ParamA", "ParamB"]), None).unwrap();
    assert!(c.fun(&arr1(&[2.0, 5.0])).unwrap() > 0.0);
    assert!(c.fun(&arr1(&[5.0, 2.0])).unwrap() < 0.0);
}

#[test]
fn test_min_ratio_with_nonnegative_denominator() {
    let mut c = interpret("ParamA/ParamB >= 0.5").unwrap();
    assert_eq!(
        c,
        Constraint::from(RatioBound::new("ParamA", "ParamB", Some(0.5), None))
    );

    c.link(&ratio_table(), None).unwrap();
    // x = [ParamA, ParamB, ParamC]
    assert!(c.fun(&arr1(&[3.0, 4.0, 0.0])).unwrap() >= 0.0);
    assert!(c.fun(&arr1(&[2.0, 4.0, 0.0])).unwrap().abs() < 1e-12);
    assert!(c.fun(&arr1(&[1.0, 4.0, 0.0])).unwrap() < 0.0);
    assert!(c.is_binding(&arr1(&[2.0, 4.0, 0.0])).unwrap());
    assert_eq!(
        c.binding_note(&arr1(&[2.0, 4.0, 0.0])).unwrap(),
        "ParamA/ParamB >= 0.5"
    );
}

#[test]
fn test_two_sided_ratio_has_two_rows() {
    let mut table = ParameterTable::new();
    table.add_param("X", 0.5).unwrap();
    table.add_param_with_bounds("Y", 1.0, 0.0, 10.0).unwrap();

    let mut c = interpret("0.2 <= X/Y <= 0.8").unwrap();
    assert_eq!(
        c,
        Constraint::from(RatioBound::new("X", "Y", Some(0.2), Some(0.8)))
    );
    c.link(&table, None).unwrap();

    let lc = c.linear_form().unwrap();
    assert_eq!(lc.n_rows(), 2);
    assert_eq!(lc.lb.to_vec(), vec![0.0, 0.0]);
    assert!(lc.ub.iter().all(|v| v.is_infinite()));

    // Inside the band both rows hold
    let inside = arr1(&[0.5, 1.0]);
    assert!(lc.is_satisfied(&inside, 0.0).unwrap());
    assert!(c.fun(&inside).unwrap() > 0.0);

    // Above the band the maximum side binds
    let above = arr1(&[0.9, 1.0]);
    assert!(c.fun(&above).unwrap() < 0.0);
    assert!(!lc.is_satisfied(&above, 0.0).unwrap());
    assert_eq!(c.binding_note(&above).unwrap(), "X/Y <= 0.8");

    // Below the band the minimum side binds
    let below = arr1(&[0.1, 1.0]);
    assert!(c.fun(&below).unwrap() < 0.0);
    assert_eq!(c.binding_note(&below).unwrap(), "X/Y >= 0.2");
}

#[test]
fn test_ambiguous_denominator() {
    let mut table = ParameterTable::new();
    table.add_param("A", 0.0).unwrap();
    table.add_param_with_bounds("B", 0.0, -5.0, 5.0).unwrap();

    let mut c = interpret("A/B >= 0.5").unwrap();
    let err = c.link(&table, None).unwrap_err();
    assert!(matches!(err, ConstraintError::AmbiguousDenominator { .. }));
    assert!(err.is_configuration_error());
    assert!(!c.is_linked());
}

#[test]
fn test_duplicate_ordering_collapses() {
    let table = table_of(&["A", "B"]);
    let mut collection = ConstraintCollection::new();
    collection.push("A<=B", &table).unwrap();
    collection.push("A<=B", &table).unwrap();
    assert_eq!(collection.len(), 1);
}

#[test]
fn test_negative_denominator_flips() {
    let mut table = ParameterTable::new();
    table.add_param("cost_car", -1.0).unwrap();
    table
        .add_param_with_bounds("cost", -0.5, f64::NEG_INFINITY, 0.0)
        .unwrap();

    // value of time: cost_car / cost >= 2
    let mut c = interpret("cost_car/cost >= 2").unwrap();
    c.link(&table, None).unwrap();

    // -3 / -1 = 3 satisfies, -1 / -1 = 1 does not
    assert!(c.fun(&arr1(&[-3.0, -1.0])).unwrap() > 0.0);
    assert!(c.fun(&arr1(&[-1.0, -1.0])).unwrap() < 0.0);
}

#[test]
fn test_unknown_parameter_is_reported_at_link_time() {
    let mut c = interpret("ParamA <= ParamZ").unwrap();
    let err = c.link(&table_of(&["ParamA"]), None).unwrap_err();
    assert_eq!(
        err,
        ConstraintError::UnknownParameter {
            name: "ParamZ".to_string()
        }
    );
}

#[test]
fn test_evaluation_before_link() {
    let c = interpret("ParamA <= ParamB").unwrap();
    assert!(matches!(
        c.fun(&arr1(&[0.0, 0.0])),
        Err(ConstraintError::NotLinked { .. })
    ));
    assert!(c.linear_form().is_err());
}

#[test]
fn test_wrong_vector_length() {
    let mut c = interpret("ParamA <= ParamB").unwrap();
    c.link(&table_of(&["ParamA", "ParamB"]), None).unwrap();
    assert!(matches!(
        c.jac(&arr1(&[0.0, 0.0, 0.0])),
        Err(ConstraintError::DimensionMismatch { expected: 2, actual: 3 })
    ));
}
