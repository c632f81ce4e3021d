//! Bounds on the ratio of two parameters: `min_ratio <= p_num / p_den <= max_ratio`
//!
//! The ratio is never computed. Once the sign of the denominator is known
//! from its declared bounds, each side becomes a linear inequality:
//!
//! | denominator | `num/den >= r`       | `num/den <= r`       |
//! |-------------|----------------------|----------------------|
//! | `>= 0`      | `num - r·den >= 0`   | `r·den - num >= 0`   |
//! | `<= 0`      | `r·den - num >= 0`   | `num - r·den >= 0`   |
//!
//! Each side is further multiplied by `max(|r|, 1/|r|) · scale` so both sides
//! carry comparable magnitude however far `r` is from one.

use crate::constraints::error::ConstraintError;
use crate::constraints::solver::LinearConstraint;
use crate::constraints::{
    check_dimension, check_scale, resolve_index, ParametricConstraint, DEFAULT_BINDING_TOL,
    DEFAULT_SCALE,
};
use crate::parameters::{ParameterLookup, Sign};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keeps the ratio of two parameters within literal bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioBound {
    p_num: String,
    p_den: String,
    #[serde(default)]
    min_ratio: Option<f64>,
    #[serde(default)]
    max_ratio: Option<f64>,
    #[serde(default = "default_scale")]
    scale: f64,
    #[serde(default = "default_binding_tol")]
    binding_tol: f64,
    #[serde(skip)]
    link: Option<RatioLink>,
}

/// Coefficients of one linearized side: `num·x[i_num] + den·x[i_den] >= 0`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Side {
    num: f64,
    den: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RatioLink {
    i_num: usize,
    i_den: usize,
    len: usize,
    min_side: Option<Side>,
    max_side: Option<Side>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Binding {
    Min(Side),
    Max(Side),
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

fn default_binding_tol() -> f64 {
    DEFAULT_BINDING_TOL
}

/// Magnitude equalizer for a ratio bound `r`
fn ratio_scaling(ratio: f64) -> f64 {
    let magnitude = ratio.abs();
    if magnitude == 0.0 {
        1.0
    } else {
        magnitude.max(1.0 / magnitude)
    }
}

impl RatioLink {
    fn eval(&self, side: Option<Side>, x: &Array1<f64>) -> f64 {
        match side {
            Some(side) => side.num * x[self.i_num] + side.den * x[self.i_den],
            None => f64::INFINITY,
        }
    }

    fn binding(&self, x: &Array1<f64>) -> Option<Binding> {
        let min_value = self.eval(self.min_side, x);
        let max_value = self.eval(self.max_side, x);
        match (self.min_side, self.max_side) {
            (Some(side), _) if min_value < max_value => Some(Binding::Min(side)),
            (_, Some(side)) => Some(Binding::Max(side)),
            (Some(side), None) => Some(Binding::Min(side)),
            (None, None) => None,
        }
    }

    fn row(&self, side: Side) -> Array1<f64> {
        let mut row = Array1::zeros(self.len);
        row[self.i_num] += side.num;
        row[self.i_den] += side.den;
        row
    }
}

impl RatioBound {
    /// Create an unlinked ratio bound
    ///
    /// # Examples
    ///
    /// ```
    /// use choice_constraints::constraints::RatioBound;
    ///
    /// let bound = RatioBound::new("X", "Y", Some(0.2), Some(0.8));
    /// assert_eq!(bound.to_string(), "0.2 <= X/Y <= 0.8");
    /// ```
    pub fn new(
        p_num: impl Into<String>,
        p_den: impl Into<String>,
        min_ratio: Option<f64>,
        max_ratio: Option<f64>,
    ) -> Self {
        Self {
            p_num: p_num.into(),
            p_den: p_den.into(),
            min_ratio,
            max_ratio,
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

    pub fn p_num(&self) -> &str {
        &self.p_num
    }

    pub fn p_den(&self) -> &str {
        &self.p_den
    }

    pub fn min_ratio(&self) -> Option<f64> {
        self.min_ratio
    }

    pub fn max_ratio(&self) -> Option<f64> {
        self.max_ratio
    }

    /// Linked positions of `(p_num, p_den)`
    pub fn indices(&self) -> Option<(usize, usize)> {
        self.link.map(|link| (link.i_num, link.i_den))
    }

    fn linked(&self, x: &Array1<f64>) -> Result<RatioLink, ConstraintError> {
        let link = self.link.ok_or_else(|| ConstraintError::NotLinked {
            constraint: self.to_string(),
        })?;
        check_dimension(x, link.len)?;
        Ok(link)
    }

    fn denominator_sign(&self, table: &dyn ParameterLookup) -> Result<Sign, ConstraintError> {
        let bounds = table
            .bounds_of(&self.p_den)
            .ok_or_else(|| ConstraintError::UnknownParameter {
                name: self.p_den.clone(),
            })?;
        bounds.sign().ok_or_else(|| ConstraintError::AmbiguousDenominator {
            name: self.p_den.clone(),
            min: bounds.min,
            max: bounds.max,
        })
    }
}

impl ParametricConstraint for RatioBound {
    fn link(
        &mut self,
        table: &dyn ParameterLookup,
        scale: Option<f64>,
    ) -> Result<(), ConstraintError> {
        let scale = check_scale(scale.unwrap_or(self.scale))?;
        let i_num = resolve_index(table, &self.p_num)?;
        let i_den = resolve_index(table, &self.p_den)?;

        let sign = if self.min_ratio.is_some() || self.max_ratio.is_some() {
            Some(self.denominator_sign(table)?)
        } else {
            None
        };
        // +1 keeps the inequality direction, -1 flips it for a nonpositive denominator
        let flip = match sign {
            Some(Sign::NonPositive) => -1.0,
            _ => 1.0,
        };

        let min_side = self.min_ratio.map(|r| {
            let scaling = ratio_scaling(r) * scale * flip;
            Side {
                num: scaling,
                den: -r * scaling,
            }
        });
        let max_side = self.max_ratio.map(|r| {
            let scaling = ratio_scaling(r) * scale * flip;
            Side {
                num: -scaling,
                den: r * scaling,
            }
        });

        self.scale = scale;
        self.link = Some(RatioLink {
            i_num,
            i_den,
            len: table.len(),
            min_side,
            max_side,
        });
        log::debug!(
            "linked '{}' at indices ({}, {}), denominator sign {:?}",
            self,
            i_num,
            i_den,
            sign
        );
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
        vec![self.p_num.as_str(), self.p_den.as_str()]
    }

    fn fun(&self, x: &Array1<f64>) -> Result<f64, ConstraintError> {
        let link = self.linked(x)?;
        Ok(link.eval(link.min_side, x).min(link.eval(link.max_side, x)))
    }

    fn jac(&self, x: &Array1<f64>) -> Result<Array1<f64>, ConstraintError> {
        let link = self.linked(x)?;
        Ok(match link.binding(x) {
            Some(Binding::Min(side)) | Some(Binding::Max(side)) => link.row(side),
            None => Array1::zeros(link.len),
        })
    }

    fn linear_form(&self) -> Result<LinearConstraint, ConstraintError> {
        let link = self.link.ok_or_else(|| ConstraintError::NotLinked {
            constraint: self.to_string(),
        })?;
        let sides: Vec<Side> = [link.min_side, link.max_side].into_iter().flatten().collect();

        let mut a = Array2::zeros((sides.len(), link.len));
        for (mut a_row, side) in a.rows_mut().into_iter().zip(&sides) {
            a_row.assign(&link.row(*side));
        }
        LinearConstraint::new(
            a,
            Array1::zeros(sides.len()),
            Array1::from_elem(sides.len(), f64::INFINITY),
        )
    }

    fn binding_note(&self, x: &Array1<f64>) -> Result<String, ConstraintError> {
        let link = self.linked(x)?;
        Ok(match (link.binding(x), self.min_ratio, self.max_ratio) {
            (Some(Binding::Min(_)), Some(r), _) => format!("{}/{} >= {}", self.p_num, self.p_den, r),
            (Some(Binding::Max(_)), _, Some(r)) => format!("{}/{} <= {}", self.p_num, self.p_den, r),
            _ => format!("{}/{} is unbounded", self.p_num, self.p_den),
        })
    }
}

/// Structural equality: same numerator, denominator and literal ratio bounds
impl PartialEq for RatioBound {
    fn eq(&self, other: &Self) -> bool {
        self.p_num == other.p_num
            && self.p_den == other.p_den
            && self.min_ratio == other.min_ratio
            && self.max_ratio == other.max_ratio
    }
}

impl fmt::Display for RatioBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min_ratio, self.max_ratio) {
            (Some(lo), Some(hi)) => write!(f, "{} <= {}/{} <= {}", lo, self.p_num, self.p_den, hi),
            (Some(lo), None) => write!(f, "{}/{} >= {}", self.p_num, self.p_den, lo),
            (None, Some(hi)) => write!(f, "{}/{} <= {}", self.p_num, self.p_den, hi),
            (None, None) => write!(f, "{}/{} (unbounded)", self.p_num, self.p_den),
        }
    }
}
