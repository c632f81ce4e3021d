//! Literal bounds on a single parameter: `minimum <= p <= maximum`

use crate::constraints::error::ConstraintError;
use crate::constraints::solver::LinearConstraint;
use crate::constraints::{
    check_dimension, check_scale, resolve_index, ParametricConstraint,
    DEFAULT_BINDING_TOL, DEFAULT_SCALE,
};
use crate::parameters::ParameterLookup;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keeps one parameter inside a literal interval
///
/// Either side may be absent. With neither side set the bound is vacuous
/// and its value function is `+inf` everywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedBound {
    p: String,
    #[serde(default)]
    minimum: Option<f64>,
    #[serde(default)]
    maximum: Option<f64>,
    #[serde(default = "default_scale")]
    scale: f64,
    #[serde(default = "default_binding_tol")]
    binding_tol: f64,
    #[serde(skip)]
    link: Option<FixedLink>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FixedLink {
    i: usize,
    len: usize,
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

fn default_binding_tol() -> f64 {
    DEFAULT_BINDING_TOL
}

impl FixedBound {
    /// Create an unlinked bound on `p`
    ///
    /// # Examples
    ///
    /// ```
    /// use choice_constraints::constraints::FixedBound;
    ///
    /// let bound = FixedBound::new("Param1", Some(-3.0), Some(3.0));
    /// assert_eq!(bound.to_string(), "-3 <= Param1 <= 3");
    /// ```
    pub fn new(p: impl Into<String>, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        Self {
            p: p.into(),
            minimum,
            maximum,
            scale: DEFAULT_SCALE,
            binding_tol: DEFAULT_BINDING_TOL,
            link: None,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_binding_tol(mut self, binding_tol: f64) -> Self {
        self.binding_tol = binding_tol;
        self
    }

    pub(crate) fn set_binding_tol(&mut self, binding_tol: f64) {
        self.binding_tol = binding_tol;
    }

    pub(crate) fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn p(&self) -> &str {
        &self.p
    }

    pub fn minimum(&self) -> Option<f64> {
        self.minimum
    }

    pub fn maximum(&self) -> Option<f64> {
        self.maximum
    }

    /// Linked position of the parameter
    pub fn index(&self) -> Option<usize> {
        self.link.map(|link| link.i)
    }

    fn linked(&self, x: &Array1<f64>) -> Result<FixedLink, ConstraintError> {
        let link = self.link.ok_or_else(|| ConstraintError::NotLinked {
            constraint: self.to_string(),
        })?;
        check_dimension(x, link.len)?;
        Ok(link)
    }

    fn min_fun(&self, value: f64) -> f64 {
        match self.minimum {
            Some(minimum) => (value - minimum) * self.scale,
            None => f64::INFINITY,
        }
    }

    fn max_fun(&self, value: f64) -> f64 {
        match self.maximum {
            Some(maximum) => (maximum - value) * self.scale,
            None => f64::INFINITY,
        }
    }

    fn lower_is_binding(&self, value: f64) -> bool {
        self.min_fun(value) < self.max_fun(value)
    }
}

impl ParametricConstraint for FixedBound {
    fn link(
        &mut self,
        table: &dyn ParameterLookup,
        scale: Option<f64>,
    ) -> Result<(), ConstraintError> {
        let scale = check_scale(scale.unwrap_or(self.scale))?;
        let i = resolve_index(table, &self.p)?;

        if self.minimum.is_none() && self.maximum.is_none() {
            log::warn!("bound on '{}' has neither a minimum nor a maximum", self.p);
        }

        self.scale = scale;
        self.link = Some(FixedLink { i, len: table.len() });
        log::debug!("linked '{}' at index {} (scale {})", self, i, scale);
        Ok(())
    }

    fn unlink(&mut self) {
        self.link = None;
    }

    fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn binding_tol(&self) -> f64 {
        self.binding_tol
    }

    fn parameters(&self) -> Vec<&str> {
        vec![self.p.as_str()]
    }

    fn fun(&self, x: &Array1<f64>) -> Result<f64, ConstraintError> {
        let link = self.linked(x)?;
        let value = x[link.i];
        Ok(self.min_fun(value).min(self.max_fun(value)))
    }

    fn jac(&self, x: &Array1<f64>) -> Result<Array1<f64>, ConstraintError> {
        let link = self.linked(x)?;
        let value = x[link.i];
        let mut j = Array1::zeros(link.len);
        if self.lower_is_binding(value) {
            j[link.i] = self.scale;
        } else if self.maximum.is_some() {
            j[link.i] = -self.scale;
        }
        Ok(j)
    }

    fn linear_form(&self) -> Result<LinearConstraint, ConstraintError> {
        let link = self.link.ok_or_else(|| ConstraintError::NotLinked {
            constraint: self.to_string(),
        })?;
        let mut a = Array2::zeros((1, link.len));
        a[[0, link.i]] = 1.0;
        LinearConstraint::new(
            a,
            Array1::from(vec![self.minimum.unwrap_or(f64::NEG_INFINITY)]),
            Array1::from(vec![self.maximum.unwrap_or(f64::INFINITY)]),
        )
    }

    fn binding_note(&self, x: &Array1<f64>) -> Result<String, ConstraintError> {
        let link = self.linked(x)?;
        let value = x[link.i];
        Ok(match (self.minimum, self.maximum) {
            (None, None) => format!("{} is unbounded", self.p),
            (Some(minimum), None) => format!("{} >= {}", self.p, minimum),
            (Some(minimum), Some(_)) if self.lower_is_binding(value) => {
                format!("{} >= {}", self.p, minimum)
            }
            (_, Some(maximum)) => format!("{} <= {}", self.p, maximum),
        })
    }
}

/// Structural equality: same parameter and same literal bounds
impl PartialEq for FixedBound {
    fn eq(&self, other: &Self) -> bool {
        self.p == other.p && self.minimum == other.minimum && self.maximum == other.maximum
    }
}

impl fmt::Display for FixedBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.minimum, self.maximum) {
            (Some(minimum), Some(maximum)) => {
                write!(f, "{} <= {} <= {}", minimum, self.p, maximum)
            }
            (Some(minimum), None) => write!(f, "{} >= {}", self.p, minimum),
            (None, Some(maximum)) => write!(f, "{} <= {}", self.p, maximum),
            (None, None) => write!(f, "{} (unbounded)", self.p),
        }
    }
}
