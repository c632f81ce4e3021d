//! # Parametric Constraints
//!
//! Inequalities over the parameter vector that the estimator hands to an
//! external optimizer. Three kinds are supported:
//!
//! - [`FixedBound`]: `minimum <= p <= maximum`
//! - [`OrderingBound`]: `p_less <= p_more`
//! - [`RatioBound`]: `min_ratio <= p_num / p_den <= max_ratio`
//!
//! Every kind is stated twice over the same feasible region. The nonlinear
//! form is a value function that is `>= 0` exactly where the constraint holds,
//! together with its gradient. The linear form is a block `lb <= A·x <= ub`.
//!
//! Constraints refer to parameters by name. Positions in the parameter vector
//! are resolved by [`ParametricConstraint::link`] and cached. The cache is
//! only valid for the table layout it was built from. Whoever reorders,
//! grows or shrinks the table must relink (see [`ConstraintCollection::relink`]).
//!
//! ## Example Usage
//!
//! ```rust
//! use choice_constraints::constraints::{interpret, ParametricConstraint};
//! use choice_constraints::parameters::ParameterTable;
//! use ndarray::arr1;
//!
//! let mut table = ParameterTable::new();
//! table.add_param("ParamA", 0.0).unwrap();
//! table.add_param("ParamB", 0.0).unwrap();
//!
//! let mut constraint = interpret("ParamA <= ParamB").unwrap();
//! constraint.link(&table, None).unwrap();
//!
//! assert!(constraint.fun(&arr1(&[2.0, 5.0])).unwrap() > 0.0);
//! assert!(constraint.fun(&arr1(&[5.0, 2.0])).unwrap() < 0.0);
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod fixed;
pub mod grammar;
pub mod ordering;
pub mod ratio;
pub mod solver;

pub use collection::{ConstraintCollection, ConstraintItem, Mutation};
pub use config::ConstraintConfig;
pub use error::ConstraintError;
pub use fixed::FixedBound;
pub use grammar::interpret;
pub use ordering::OrderingBound;
pub use ratio::RatioBound;
pub use solver::{ConstraintKind, GradientFn, LinearConstraint, NonlinearConstraint, ValueFn};

use crate::parameters::ParameterLookup;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Multiplier applied to constraint values unless another scale is given
pub const DEFAULT_SCALE: f64 = 10.0;

/// Absolute value below which a constraint counts as binding
pub const DEFAULT_BINDING_TOL: f64 = 1e-4;

/// Capabilities shared by every constraint kind
pub trait ParametricConstraint {
    /// Resolve parameter names against `table` and cache their positions
    ///
    /// `scale`, when given, replaces the constraint's current scale. On
    /// failure the constraint is left exactly as it was.
    fn link(&mut self, table: &dyn ParameterLookup, scale: Option<f64>)
        -> Result<(), ConstraintError>;

    /// Drop the cached positions
    fn unlink(&mut self);

    fn is_linked(&self) -> bool;

    fn scale(&self) -> f64;

    fn binding_tol(&self) -> f64;

    /// Names of the referenced parameters, in constraint order
    fn parameters(&self) -> Vec<&str>;

    /// Constraint value, nonnegative where the constraint is satisfied
    fn fun(&self, x: &Array1<f64>) -> Result<f64, ConstraintError>;

    /// Gradient of [`fun`](Self::fun) with respect to the parameter vector
    fn jac(&self, x: &Array1<f64>) -> Result<Array1<f64>, ConstraintError>;

    /// The same feasible region as a linear block `lb <= A·x <= ub`
    fn linear_form(&self) -> Result<LinearConstraint, ConstraintError>;

    /// Human-readable statement of the side currently binding at `x`
    fn binding_note(&self, x: &Array1<f64>) -> Result<String, ConstraintError>;

    /// Whether the constraint is tight at `x`
    fn is_binding(&self, x: &Array1<f64>) -> Result<bool, ConstraintError> {
        Ok(self.fun(x)?.abs() < self.binding_tol())
    }
}

/// Any one of the supported constraint kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    Fixed(FixedBound),
    Ordering(OrderingBound),
    Ratio(RatioBound),
}

impl Constraint {
    pub fn with_scale(mut self, scale: f64) -> Self {
        match &mut self {
            Self::Fixed(c) => c.set_scale(scale),
            Self::Ordering(c) => c.set_scale(scale),
            Self::Ratio(c) => c.set_scale(scale),
        }
        self
    }

    pub fn with_binding_tol(mut self, binding_tol: f64) -> Self {
        match &mut self {
            Self::Fixed(c) => c.set_binding_tol(binding_tol),
            Self::Ordering(c) => c.set_binding_tol(binding_tol),
            Self::Ratio(c) => c.set_binding_tol(binding_tol),
        }
        self
    }

    /// Whether the constraint references the named parameter
    pub fn references(&self, name: &str) -> bool {
        self.parameters().contains(&name)
    }

    /// The constraint as a one-element list of solver inequality records
    ///
    /// Each record owns a snapshot of the linked constraint, so it stays
    /// valid (and stale) if the constraint is later relinked.
    pub fn as_nonlinear(&self) -> Result<Vec<NonlinearConstraint>, ConstraintError> {
        if !self.is_linked() {
            return Err(ConstraintError::NotLinked {
                constraint: self.to_string(),
            });
        }
        let for_fun = self.clone();
        let for_jac = self.clone();
        Ok(vec![NonlinearConstraint::inequality(
            Box::new(move |x: &Array1<f64>| for_fun.fun(x)),
            Box::new(move |x: &Array1<f64>| for_jac.jac(x)),
        )])
    }

    fn inner(&self) -> &dyn ParametricConstraint {
        match self {
            Self::Fixed(c) => c,
            Self::Ordering(c) => c,
            Self::Ratio(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ParametricConstraint {
        match self {
            Self::Fixed(c) => c,
            Self::Ordering(c) => c,
            Self::Ratio(c) => c,
        }
    }
}

impl ParametricConstraint for Constraint {
    fn link(
        &mut self,
        table: &dyn ParameterLookup,
        scale: Option<f64>,
    ) -> Result<(), ConstraintError> {
        self.inner_mut().link(table, scale)
    }

    fn unlink(&mut self) {
        self.inner_mut().unlink()
    }

    fn is_linked(&self) -> bool {
        self.inner().is_linked()
    }

    fn scale(&self) -> f64 {
        self.inner().scale()
    }

    fn binding_tol(&self) -> f64 {
        self.inner().binding_tol()
    }

    fn parameters(&self) -> Vec<&str> {
        self.inner().parameters()
    }

    fn fun(&self, x: &Array1<f64>) -> Result<f64, ConstraintError> {
        self.inner().fun(x)
    }

    fn jac(&self, x: &Array1<f64>) -> Result<Array1<f64>, ConstraintError> {
        self.inner().jac(x)
    }

    fn linear_form(&self) -> Result<LinearConstraint, ConstraintError> {
        self.inner().linear_form()
    }

    fn binding_note(&self, x: &Array1<f64>) -> Result<String, ConstraintError> {
        self.inner().binding_note(x)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(c) => fmt::Display::fmt(c, f),
            Self::Ordering(c) => fmt::Display::fmt(c, f),
            Self::Ratio(c) => fmt::Display::fmt(c, f),
        }
    }
}

impl FromStr for Constraint {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        interpret(s)
    }
}

impl From<FixedBound> for Constraint {
    fn from(c: FixedBound) -> Self {
        Self::Fixed(c)
    }
}

impl From<OrderingBound> for Constraint {
    fn from(c: OrderingBound) -> Self {
        Self::Ordering(c)
    }
}

impl From<RatioBound> for Constraint {
    fn from(c: RatioBound) -> Self {
        Self::Ratio(c)
    }
}

pub(crate) fn resolve_index(
    table: &dyn ParameterLookup,
    name: &str,
) -> Result<usize, ConstraintError> {
    table
        .index_of(name)
        .ok_or_else(|| ConstraintError::UnknownParameter {
            name: name.to_string(),
        })
}

pub(crate) fn check_scale(scale: f64) -> Result<f64, ConstraintError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(ConstraintError::InvalidScale { scale })
    }
}

pub(crate) fn check_dimension(x: &Array1<f64>, len: usize) -> Result<(), ConstraintError> {
    if x.len() == len {
        Ok(())
    } else {
        Err(ConstraintError::DimensionMismatch {
            expected: len,
            actual: x.len(),
        })
    }
}
