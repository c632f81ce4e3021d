//! Parameter bounds implementation
//!
//! Every row of a parameter table carries a `[min, max]` interval. Ratio
//! constraints read it to learn the sign of their denominator, so besides
//! the usual containment helpers this module also answers "is this parameter
//! pinned to one side of zero?".

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must be less than max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Parameter value {value} is outside bounds: [{min}, {max}]")]
    ValueOutsideBounds { value: f64, min: f64, max: f64 },

    #[error("NaN is not a valid bound")]
    NanBound,
}

/// The side of zero a bounded quantity is confined to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sign {
    /// Every admissible value is `>= 0`
    NonNegative,

    /// Every admissible value is `<= 0`
    NonPositive,
}

/// Represents the bounds on a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum allowed value for the parameter
    pub min: f64,

    /// Maximum allowed value for the parameter
    pub max: f64,
}

impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Bounds", 2)?;

        // Infinite ends are written as null
        if self.min.is_infinite() && self.min.is_sign_negative() {
            state.serialize_field("min", &serde_json::Value::Null)?;
        } else {
            state.serialize_field("min", &self.min)?;
        }

        if self.max.is_infinite() && self.max.is_sign_positive() {
            state.serialize_field("max", &serde_json::Value::Null)?;
        } else {
            state.serialize_field("max", &self.max)?;
        }

        state.end()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct BoundsHelper {
            #[serde(default)]
            min: Option<f64>,

            #[serde(default)]
            max: Option<f64>,
        }

        let helper = BoundsHelper::deserialize(deserializer)?;

        let min = helper.min.unwrap_or(f64::NEG_INFINITY);
        let max = helper.max.unwrap_or(f64::INFINITY);

        Bounds::new(min, max).map_err(serde::de::Error::custom)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }
}

impl Bounds {
    /// Create new bounds with min and max values
    ///
    /// # Examples
    ///
    /// ```
    /// use choice_constraints::parameters::bounds::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert_eq!(bounds.min, 0.0);
    /// assert_eq!(bounds.max, 10.0);
    /// assert!(Bounds::new(1.0, 0.0).is_err());
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        if min.is_nan() || max.is_nan() {
            return Err(BoundsError::NanBound);
        }
        if min > max {
            return Err(BoundsError::InvalidBounds { min, max });
        }

        Ok(Self { min, max })
    }

    /// Create unbounded bounds (negative infinity to positive infinity)
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Bounds with only a minimum value
    pub fn min_only(min: f64) -> Self {
        Self { min, max: f64::INFINITY }
    }

    /// Bounds with only a maximum value
    pub fn max_only(max: f64) -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max,
        }
    }

    /// Check if a value is within the bounds
    pub fn is_within_bounds(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn has_lower_bound(&self) -> bool {
        self.min.is_finite()
    }

    pub fn has_upper_bound(&self) -> bool {
        self.max.is_finite()
    }

    /// Clamp a value to be within the bounds
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// The side of zero these bounds confine a value to, if any
    ///
    /// A lower bound of zero or more wins over an upper bound of zero or
    /// less, so `[0, 0]` reports [`Sign::NonNegative`]. Bounds that straddle
    /// zero (or leave either side open across it) return `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use choice_constraints::parameters::bounds::{Bounds, Sign};
    ///
    /// assert_eq!(Bounds::min_only(0.0).sign(), Some(Sign::NonNegative));
    /// assert_eq!(Bounds::max_only(-1.0).sign(), Some(Sign::NonPositive));
    /// assert_eq!(Bounds::new(-5.0, 5.0).unwrap().sign(), None);
    /// ```
    pub fn sign(&self) -> Option<Sign> {
        if self.min >= 0.0 {
            Some(Sign::NonNegative)
        } else if self.max <= 0.0 {
            Some(Sign::NonPositive)
        } else {
            None
        }
    }
}
