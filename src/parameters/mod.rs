//! # Parameter System
//!
//! The parameter table is the collaborator that parametric constraints link
//! against. It maps each coefficient name to its position in the parameter
//! vector and carries the declared `[min, max]` bounds of every coefficient.
//!
//! ## Core Components
//!
//! - [`Parameter`]: a named coefficient with value and bounds
//! - [`ParameterTable`]: the ordered table the optimizer sees as a vector
//! - [`ParameterLookup`]: the read-only view constraints link through
//! - [`Bounds`] and [`Sign`]: parameter bounds and the sign they imply
//!
//! ## Example Usage
//!
//! ```rust
//! use choice_constraints::parameters::{ParameterLookup, ParameterTable};
//!
//! let mut table = ParameterTable::new();
//! table.add_param("ASC_TRAIN", 0.0).unwrap();
//! table.add_param_with_bounds("mu_motor", 0.5, 0.001, 1.0).unwrap();
//!
//! assert_eq!(table.index_of("mu_motor"), Some(1));
//! assert_eq!(table.values().len(), 2);
//! ```

pub mod bounds;
pub mod parameter;
pub mod parameters;

pub use bounds::{Bounds, BoundsError, Sign};
pub use parameter::{Parameter, ParameterError};
pub use parameters::{ParameterLookup, ParameterTable};
