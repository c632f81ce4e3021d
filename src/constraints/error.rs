//! Errors raised while parsing, linking and evaluating parametric constraints

use thiserror::Error;

/// Error that can occur when working with parametric constraints
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstraintError {
    /// The text matches none of the constraint grammar patterns
    #[error("cannot interpret '{text}' as a constraint")]
    Parse { text: String },

    /// A referenced parameter is absent from the parameter table
    #[error("Parameter '{name}' is not in the parameter table")]
    UnknownParameter { name: String },

    /// The denominator of a ratio is not bounded to one side of zero
    #[error(
        "Denominator '{name}' must be bounded to be non-positive or non-negative, found [{min}, {max}]"
    )]
    AmbiguousDenominator { name: String, min: f64, max: f64 },

    /// A collection was handed something that is not a constraint
    #[error("Invalid constraint item: {message}")]
    InvalidItem { message: String },

    #[error("Constraint '{constraint}' is not linked to a parameter table")]
    NotLinked { constraint: String },

    #[error("Parameter vector has length {actual}, but the constraint was linked to {expected} parameters")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Constraint index {index} is out of range for a collection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Constraint scale must be finite and positive, got {scale}")]
    InvalidScale { scale: f64 },

    #[error("Parameter '{name}' is referenced by constraint '{constraint}'")]
    ParameterInUse { name: String, constraint: String },
}

impl ConstraintError {
    /// Whether the error comes from linking against an incompatible parameter table
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownParameter { .. } | Self::AmbiguousDenominator { .. }
        )
    }
}
