//! Integration tests for the Parameter struct
//!
//! These tests verify that the Parameter struct behaves correctly in various scenarios.

use choice_constraints::parameters::{Bounds, Parameter, Sign};

#[test]
fn test_parameter_lifecycle() {
    // Create a parameter
    let mut param = Parameter::new("tt_car", -0.05);

    // Check initial state
    assert_eq!(param.name(), "tt_car");
    assert_eq!(param.value(), -0.05);
    assert!(!param.holdfast);
    assert_eq!(param.min(), f64::NEG_INFINITY);
    assert_eq!(param.max(), f64::INFINITY);

    // Change value
    param.set_value(-0.1).unwrap();
    assert_eq!(param.value(), -0.1);
    assert_eq!(param.init_value(), -0.05);

    // Reset to initial value
    param.reset();
    assert_eq!(param.value(), -0.05);

    // Set bounds
    param.set_bounds(-1.0, 0.0).unwrap();
    assert_eq!(param.min(), -1.0);
    assert_eq!(param.max(), 0.0);

    // Set value outside bounds (should fail)
    assert!(param.set_value(0.5).is_err());
    assert!(param.set_value(-2.0).is_err());

    // Set value inside bounds (should succeed)
    assert!(param.set_value(-0.5).is_ok());
    assert_eq!(param.value(), -0.5);
}

#[test]
fn test_parameter_bounds_sign() {
    let cost = Parameter::with_bounds("cost", -0.2, f64::NEG_INFINITY, 0.0).unwrap();
    assert_eq!(cost.bounds().sign(), Some(Sign::NonPositive));

    let mu = Parameter::with_bounds("mu", 0.5, 0.001, 1.0).unwrap();
    assert_eq!(mu.bounds().sign(), Some(Sign::NonNegative));

    let asc = Parameter::new("asc_bus", 0.0);
    assert_eq!(asc.bounds().sign(), None);

    let straddling = Bounds::new(-5.0, 5.0).unwrap();
    assert_eq!(straddling.sign(), None);
}

#[test]
fn test_parameter_bounds_clamping() {
    // Initial value outside bounds is clamped
    let param = Parameter::with_bounds("mu", 3.0, 0.0, 1.0).unwrap();
    assert_eq!(param.value(), 1.0);

    // Tightening the bounds clamps the current value
    let mut param = Parameter::new("beta", 5.0);
    param.set_bounds(0.0, 2.0).unwrap();
    assert_eq!(param.value(), 2.0);

    // Invalid bounds are rejected
    assert!(Parameter::with_bounds("bad", 0.0, 1.0, -1.0).is_err());
    assert!(param.set_bounds(f64::NAN, 1.0).is_err());
}

#[test]
fn test_parameter_serialization() {
    let mut param = Parameter::with_bounds("mu", 0.5, 0.0, 1.0).unwrap();
    param.holdfast = true;

    let json = serde_json::to_string(&param).unwrap();
    let back: Parameter = serde_json::from_str(&json).unwrap();
    assert_eq!(back, param);

    // Missing bounds deserialize as unbounded
    let loose: Parameter =
        serde_json::from_str(r#"{"name": "asc", "value": 1.0, "init_value": 0.0}"#).unwrap();
    assert_eq!(loose.bounds(), Bounds::unbounded());
    assert!(!loose.holdfast);
}
