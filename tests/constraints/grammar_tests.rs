//! Tests for the textual constraint grammar

use choice_constraints::constraints::{
    interpret, Constraint, ConstraintError, FixedBound, OrderingBound, RatioBound,
};

#[test]
fn test_canonical_rendering_round_trip() {
    let constraints: Vec<Constraint> = vec![
        FixedBound::new("Param1", Some(-3.0), Some(3.0)).into(),
        FixedBound::new("tt", Some(-0.25), None).into(),
        FixedBound::new("tt", None, Some(1e-3)).into(),
        OrderingBound::new("tt_car", "tt_bus").into(),
        RatioBound::new("X", "Y", Some(0.2), Some(0.8)).into(),
        RatioBound::new("tt", "cost", Some(0.5), None).into(),
        RatioBound::new("tt", "cost", None, Some(12.0)).into(),
    ];

    for c in constraints {
        let text = c.to_string();
        let parsed = interpret(&text).unwrap();
        assert_eq!(parsed, c, "{}", text);
    }
}

#[test]
fn test_direction_normalization() {
    let expected = Constraint::from(OrderingBound::new("a", "b"));
    for text in ["a<=b", "a<b", "b>=a", "b>a"] {
        assert_eq!(interpret(text).unwrap(), expected, "{}", text);
    }

    // The single-string constructor agrees with the grammar
    for text in ["a<=b", "a<b", "b>=a", "b>a"] {
        assert_eq!(
            Constraint::from(OrderingBound::parse(text).unwrap()),
            expected,
            "{}",
            text
        );
    }
}

#[test]
fn test_one_sided_directions() {
    assert_eq!(
        interpret("x <= 2").unwrap(),
        Constraint::from(FixedBound::new("x", None, Some(2.0)))
    );
    assert_eq!(
        interpret("x >= 2").unwrap(),
        Constraint::from(FixedBound::new("x", Some(2.0), None))
    );
    assert_eq!(
        interpret("2 <= x").unwrap(),
        Constraint::from(FixedBound::new("x", Some(2.0), None))
    );
    assert_eq!(
        interpret("2 >= x").unwrap(),
        Constraint::from(FixedBound::new("x", None, Some(2.0)))
    );
    assert_eq!(
        interpret("a/b < 3").unwrap(),
        Constraint::from(RatioBound::new("a", "b", None, Some(3.0)))
    );
    assert_eq!(
        interpret("a/b > 3").unwrap(),
        Constraint::from(RatioBound::new("a", "b", Some(3.0), None))
    );
}

#[test]
fn test_numeric_literals() {
    let bound = |text: &str| match interpret(text).unwrap() {
        Constraint::Fixed(c) => c.maximum(),
        other => panic!("expected a fixed bound, got {:?}", other),
    };
    assert_eq!(bound("x <= 2"), Some(2.0));
    assert_eq!(bound("x <= -2.5"), Some(-2.5));
    assert_eq!(bound("x <= +.5"), Some(0.5));
    assert_eq!(bound("x <= 1e3"), Some(1000.0));
    assert_eq!(bound("x <= 2.5E-2"), Some(0.025));
    assert_eq!(bound("x <= 3/4"), Some(0.75));
}

#[test]
fn test_parse_error_names_text() {
    let err = interpret("tt + cost <= 0").unwrap_err();
    assert_eq!(
        err,
        ConstraintError::Parse {
            text: "tt + cost <= 0".to_string()
        }
    );
    assert!(err.to_string().contains("tt + cost <= 0"));
}
