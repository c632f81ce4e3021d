//! # choice-constraints
//!
//! `choice-constraints` provides the parametric constraints a discrete-choice
//! model estimator hands to its optimizer: bounds on a single coefficient,
//! orderings between two coefficients and bounds on the ratio of two
//! coefficients.
//!
//! The library provides:
//! - Three constraint kinds, each with a smooth value function, its analytic
//!   gradient and an equivalent linear form
//! - A one-line textual grammar such as `"-3 <= tt <= 3"` or `"tt/cost >= 0.5"`
//! - A duplicate-aware collection that stays linked to a changing parameter table
//! - A model type that owns the table and the collection and tracks staleness
//!
//! ## Basic Usage
//!
//! ```
//! use choice_constraints::model::ConstrainedModel;
//! use choice_constraints::parameters::Parameter;
//! use ndarray::arr1;
//!
//! let mut model = ConstrainedModel::new();
//! model.add_parameter(Parameter::new("tt_car", -0.5)).unwrap();
//! model.add_parameter(Parameter::new("tt_bus", -0.2)).unwrap();
//! model.push_constraint("tt_car <= tt_bus").unwrap();
//!
//! let records = model.nonlinear_constraints().unwrap();
//! assert!(records[0].value(&arr1(&[-0.5, -0.2])).unwrap() > 0.0);
//! ```

pub mod constraints;
pub mod error;
pub mod model;
pub mod parameters;

// Re-exports for convenience
pub use constraints::{
    interpret, Constraint, ConstraintCollection, ConstraintConfig, ConstraintError, FixedBound,
    OrderingBound, ParametricConstraint, RatioBound,
};
pub use error::{Error, Result};
pub use model::ConstrainedModel;
pub use parameters::{Parameter, ParameterLookup, ParameterTable};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
