//! Configuration options for constraint collections.

use crate::constraints::{DEFAULT_BINDING_TOL, DEFAULT_SCALE};
use serde::{Deserialize, Serialize};

/// Configuration options for a [`ConstraintCollection`](super::ConstraintCollection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintConfig {
    /// Scale given to constraints parsed from text. Default: 10.0
    pub default_scale: f64,

    /// Binding tolerance given to constraints parsed from text. Default: 1e-4
    pub binding_tol: f64,

    /// Whether structurally equal constraints may be stored twice. Default: false
    pub allow_dupes: bool,

    /// Random rescaling draws `exp(u)` with `u` uniform on `[-r, r]`. Default: 3.0
    pub rescale_log_range: f64,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            default_scale: DEFAULT_SCALE,
            binding_tol: DEFAULT_BINDING_TOL,
            allow_dupes: false,
            rescale_log_range: 3.0,
        }
    }
}
