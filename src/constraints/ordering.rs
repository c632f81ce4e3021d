//! Ordering between two parameters: `p_less <= p_more`

use crate::constraints::error::ConstraintError;
use crate::constraints::solver::LinearConstraint;
use crate::constraints::{
    check_dimension, check_scale, resolve_index, ParametricConstraint, DEFAULT_BINDING_TOL,
    DEFAULT_SCALE,
};
use crate::parameters::ParameterLookup;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keeps one parameter no greater than another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderingBound {
    p_less: String,
    p_more: String,
    #[serde(default = "default_scale")]
    scale: f64,
    #[serde(default = "default_binding_tol")]
    binding_tol: f64,
    #[serde(skip)]
    link: Option<OrderingLink>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderingLink {
    i_less: usize,
    i_more: usize,
    len: usize,
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

fn default_binding_tol() -> f64 {
    DEFAULT_BINDING_TOL
}

impl OrderingBound {
    pub fn new(p_less: impl Into<String>, p_more: impl Into<String>) -> Self {
        Self {
            p_less: p_less.into(),
            p_more: p_more.into(),
            scale: DEFAULT_SCALE,
            binding_tol: DEFAULT_BINDING_TOL,
            link: None,
        }
    }

    /// Build an ordering from a single comparison such as `"a <= b"` or `"b > a"`
    ///
    /// The operators are looked for in the order `<=`, `<`, `>=`, `>`, and the
    /// text is split at the first occurrence of the first one found. Either
    /// direction yields the same bound with the smaller side stored first.
    ///
    /// # Examples
    ///
    /// ```
    /// use choice_constraints::constraints::OrderingBound;
    ///
    /// let written_up = OrderingBound::parse("a <= b").unwrap();
    /// let written_down = OrderingBound::parse("b > a").unwrap();
    /// assert_eq!(written_up, written_down);
    /// assert_eq!(written_down.p_less(), "a");
    /// ```
    pub fn parse(text: &str) -> Result<Self, ConstraintError> {
        let split = |op: &str| {
            text.split_once(op)
                .map(|(left, right)| (left.trim(), right.trim()))
        };

        let (p_less, p_more) = if let Some((left, right)) = split("<=") {
            (left, right)
        } else if let Some((left, right)) = split("<") {
            (left, right)
        } else if let Some((left, right)) = split(">=") {
            (right, left)
        } else if let Some((left, right)) = split(">") {
            (right, left)
        } else {
            return Err(ConstraintError::Parse {
                text: text.to_string(),
            });
        };

        if p_less.is_empty() || p_more.is_empty() {
            return Err(ConstraintError::Parse {
                text: text.to_string(),
            });
        }
        Ok(Self::new(p_less, p_more))
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

    pub fn p_less(&self) -> &str {
        &self.p_less
    }

    pub fn p_more(&self) -> &str {
        &self.p_more
    }

    /// Linked positions of `(p_less, p_more)`
    pub fn indices(&self) -> Option<(usize, usize)> {
        self.link.map(|link| (link.i_less, link.i_more))
    }

    fn linked(&self, x: &Array1<f64>) -> Result<OrderingLink, ConstraintError> {
        let link = self.link.ok_or_else(|| ConstraintError::NotLinked {
            constraint: self.to_string(),
        })?;
        check_dimension(x, link.len)?;
        Ok(link)
    }
}

impl ParametricConstraint for OrderingBound {
    fn link(
        &mut self,
        table: &dyn ParameterLookup,
        scale: Option<f64>,
    ) -> Result<(), ConstraintError> {
        let scale = check_scale(scale.unwrap_or(self.scale))?;
        let i_less = resolve_index(table, &self.p_less)?;
        let i_more = resolve_index(table, &self.p_more)?;

        self.scale = scale;
        self.link = Some(OrderingLink {
            i_less,
            i_more,
            len: table.len(),
        });
        log::debug!("linked '{}' at indices ({}, {})", self, i_less, i_more);
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
        vec![self.p_less.as_str(), self.p_more.as_str()]
    }

    fn fun(&self, x: &Array1<f64>) -> Result<f64, ConstraintError> {
        let link = self.linked(x)?;
        Ok((x[link.i_more] - x[link.i_less]) * self.scale)
    }

    fn jac(&self, x: &Array1<f64>) -> Result<Array1<f64>, ConstraintError> {
        let link = self.linked(x)?;
        let mut j = Array1::zeros(link.len);
        j[link.i_more] += self.scale;
        j[link.i_less] -= self.scale;
        Ok(j)
    }

    fn linear_form(&self) -> Result<LinearConstraint, ConstraintError> {
        let link = self.link.ok_or_else(|| ConstraintError::NotLinked {
            constraint: self.to_string(),
        })?;
        let mut a = Array2::zeros((1, link.len));
        a[[0, link.i_more]] += self.scale;
        a[[0, link.i_less]] -= self.scale;
        LinearConstraint::new(
            a,
            Array1::zeros(1),
            Array1::from(vec![f64::INFINITY]),
        )
    }

    fn binding_note(&self, x: &Array1<f64>) -> Result<String, ConstraintError> {
        self.linked(x)?;
        Ok(self.to_string())
    }
}

/// Structural equality: same ordered pair of parameters
impl PartialEq for OrderingBound {
    fn eq(&self, other: &Self) -> bool {
        self.p_less == other.p_less && self.p_more == other.p_more
    }
}

impl fmt::Display for OrderingBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <= {}", self.p_less, self.p_more)
    }
}
