//! Export formats consumed by external optimizers
//!
//! Nonlinear solvers take a list of inequality records, each a value function
//! and its gradient, feasible where the value is `>= 0`. Linear solvers take
//! one stacked matrix `A` with per-row bounds, feasible where
//! `lb <= A·x <= ub`.

use crate::constraints::error::ConstraintError;
use ndarray::{concatenate, Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::fmt;

/// Boxed constraint value function
pub type ValueFn = Box<dyn Fn(&Array1<f64>) -> Result<f64, ConstraintError> + Send + Sync>;

/// Boxed constraint gradient function
pub type GradientFn =
    Box<dyn Fn(&Array1<f64>) -> Result<Array1<f64>, ConstraintError> + Send + Sync>;

/// Kind of a nonlinear constraint record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Satisfied where the value function is nonnegative
    Inequality,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inequality => "ineq",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `{kind, fun, jac}` record for nonlinear solvers
pub struct NonlinearConstraint {
    pub kind: ConstraintKind,
    pub fun: ValueFn,
    pub jac: GradientFn,
}

impl NonlinearConstraint {
    pub fn inequality(fun: ValueFn, jac: GradientFn) -> Self {
        Self {
            kind: ConstraintKind::Inequality,
            fun,
            jac,
        }
    }

    pub fn value(&self, x: &Array1<f64>) -> Result<f64, ConstraintError> {
        (self.fun)(x)
    }

    pub fn gradient(&self, x: &Array1<f64>) -> Result<Array1<f64>, ConstraintError> {
        (self.jac)(x)
    }
}

impl fmt::Debug for NonlinearConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonlinearConstraint")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Linear constraint block `lb <= A·x <= ub`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// Coefficient matrix, one row per scalar constraint
    pub a: Array2<f64>,

    /// Lower bound of each row
    pub lb: Array1<f64>,

    /// Upper bound of each row
    pub ub: Array1<f64>,
}

impl LinearConstraint {
    /// Create a linear constraint block, checking that the shapes agree
    pub fn new(a: Array2<f64>, lb: Array1<f64>, ub: Array1<f64>) -> Result<Self, ConstraintError> {
        if lb.len() != a.nrows() {
            return Err(ConstraintError::DimensionMismatch {
                expected: a.nrows(),
                actual: lb.len(),
            });
        }
        if ub.len() != a.nrows() {
            return Err(ConstraintError::DimensionMismatch {
                expected: a.nrows(),
                actual: ub.len(),
            });
        }
        Ok(Self { a, lb, ub })
    }

    /// A block with no rows over `n_params` parameters
    pub fn empty(n_params: usize) -> Self {
        Self {
            a: Array2::zeros((0, n_params)),
            lb: Array1::zeros(0),
            ub: Array1::zeros(0),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.a.nrows()
    }

    pub fn n_params(&self) -> usize {
        self.a.ncols()
    }

    /// Concatenate blocks row-wise, in the given order
    ///
    /// Every block must span `n_params` columns.
    pub fn stack(parts: &[LinearConstraint], n_params: usize) -> Result<Self, ConstraintError> {
        if let Some(bad) = parts.iter().find(|p| p.n_params() != n_params) {
            return Err(ConstraintError::DimensionMismatch {
                expected: n_params,
                actual: bad.n_params(),
            });
        }
        if parts.is_empty() {
            return Ok(Self::empty(n_params));
        }

        let shape_err = |_| ConstraintError::DimensionMismatch {
            expected: n_params,
            actual: 0,
        };
        let a_views: Vec<ArrayView2<f64>> = parts.iter().map(|p| p.a.view()).collect();
        let lb_views: Vec<ArrayView1<f64>> = parts.iter().map(|p| p.lb.view()).collect();
        let ub_views: Vec<ArrayView1<f64>> = parts.iter().map(|p| p.ub.view()).collect();

        Ok(Self {
            a: concatenate(Axis(0), &a_views).map_err(shape_err)?,
            lb: concatenate(Axis(0), &lb_views).map_err(shape_err)?,
            ub: concatenate(Axis(0), &ub_views).map_err(shape_err)?,
        })
    }

    /// Row activities `A·x`
    pub fn activity(&self, x: &Array1<f64>) -> Result<Array1<f64>, ConstraintError> {
        if x.len() != self.n_params() {
            return Err(ConstraintError::DimensionMismatch {
                expected: self.n_params(),
                actual: x.len(),
            });
        }
        Ok(self.a.dot(x))
    }

    /// Whether every row satisfies `lb - tol <= A·x <= ub + tol`
    pub fn is_satisfied(&self, x: &Array1<f64>, tol: f64) -> Result<bool, ConstraintError> {
        let activity = self.activity(x)?;
        Ok(activity
            .iter()
            .zip(self.lb.iter().zip(self.ub.iter()))
            .all(|(&v, (&lo, &hi))| v >= lo - tol && v <= hi + tol))
    }
}
