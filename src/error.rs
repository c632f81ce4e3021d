use crate::constraints::ConstraintError;
use crate::parameters::{BoundsError, ParameterError};
use thiserror::Error;

/// Error types for the choice-constraints library.
#[derive(Error, Debug)]
pub enum Error {
    /// Error raised by a constraint or a constraint collection.
    #[error("Constraint error: {0}")]
    Constraint(#[from] ConstraintError),

    /// Error raised by the parameter table.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// Error for invalid parameter bounds.
    #[error("Bounds error: {0}")]
    Bounds(#[from] BoundsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error comes from a constraint that cannot be resolved
    /// against the current parameter table
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Constraint(e) if e.is_configuration_error())
    }
}

/// Result type alias for choice-constraints operations.
pub type Result<T> = std::result::Result<T, Error>;
