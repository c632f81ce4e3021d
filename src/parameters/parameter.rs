//! Parameter definition and implementation
//!
//! A [`Parameter`] is one row of the parameter table: a named coefficient with
//! a current value, the value it started from, and the bounds the estimator
//! is allowed to move it within.

use crate::parameters::bounds::{Bounds, BoundsError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Bounds error: {0}")]
    BoundsError(#[from] BoundsError),

    #[error("Parameter '{name}' not found")]
    ParameterNotFound { name: String },

    #[error("Parameter '{name}' already exists")]
    DuplicateParameter { name: String },

    #[error("Reordering must list every parameter exactly once: {message}")]
    InvalidOrdering { message: String },

    #[error("Expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// A named model coefficient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Name of the parameter
    name: String,

    /// Current value of the parameter
    value: f64,

    /// Initial value when created (for reset operations)
    init_value: f64,

    /// Minimum and maximum bounds for the parameter value
    #[serde(default)]
    bounds: Bounds,

    /// Whether the estimator must keep this parameter at its current value
    #[serde(default)]
    pub holdfast: bool,
}

impl Parameter {
    /// Create a new unbounded parameter with the given name and value
    ///
    /// # Examples
    ///
    /// ```
    /// use choice_constraints::parameters::parameter::Parameter;
    ///
    /// let param = Parameter::new("tt_cost", -0.5);
    /// assert_eq!(param.name(), "tt_cost");
    /// assert_eq!(param.value(), -0.5);
    /// assert!(!param.holdfast);
    /// ```
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            init_value: value,
            bounds: Bounds::default(),
            holdfast: false,
        }
    }

    /// Create a new parameter with the given name, value, and bounds
    ///
    /// The value is clamped into the bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use choice_constraints::parameters::parameter::Parameter;
    ///
    /// let param = Parameter::with_bounds("mu_car", 2.0, 0.0, 1.0).unwrap();
    /// assert_eq!(param.value(), 1.0);
    /// assert_eq!(param.min(), 0.0);
    /// assert_eq!(param.max(), 1.0);
    /// ```
    pub fn with_bounds(name: &str, value: f64, min: f64, max: f64) -> Result<Self, ParameterError> {
        let bounds = Bounds::new(min, max)?;
        let value = bounds.clamp(value);

        Ok(Self {
            name: name.to_string(),
            value,
            init_value: value,
            bounds,
            holdfast: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value of the parameter
    ///
    /// Fails if the value is outside the parameter's bounds.
    pub fn set_value(&mut self, value: f64) -> Result<(), ParameterError> {
        if !self.bounds.is_within_bounds(value) {
            return Err(ParameterError::BoundsError(BoundsError::ValueOutsideBounds {
                value,
                min: self.bounds.min,
                max: self.bounds.max,
            }));
        }

        self.value = value;
        Ok(())
    }

    pub fn init_value(&self) -> f64 {
        self.init_value
    }

    /// Reset the parameter to its initial value, clamped into the current bounds
    pub fn reset(&mut self) {
        self.value = self.bounds.clamp(self.init_value);
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn min(&self) -> f64 {
        self.bounds.min
    }

    pub fn max(&self) -> f64 {
        self.bounds.max
    }

    /// Set the bounds for the parameter
    ///
    /// The current value is clamped into the new bounds.
    pub fn set_bounds(&mut self, min: f64, max: f64) -> Result<(), ParameterError> {
        let bounds = Bounds::new(min, max)?;
        self.bounds = bounds;
        self.value = bounds.clamp(self.value);

        Ok(())
    }
}
