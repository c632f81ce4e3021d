//! Parameter table implementation
//!
//! [`ParameterTable`] is the ordered collection of model coefficients that
//! the optimizer sees as a flat vector. The position of a parameter in the
//! table is its index in that vector, so anything caching indices (the
//! parametric constraints) has to be relinked whenever the table is
//! reordered, grown or shrunk.

use crate::parameters::bounds::Bounds;
use crate::parameters::parameter::{Parameter, ParameterError};
use indexmap::IndexMap;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Read-only view of a parameter table used to link constraints
///
/// Constraints never own the table. They resolve names to positions through
/// this trait and read the declared bounds of the parameters they reference.
pub trait ParameterLookup {
    /// Position of the named parameter in the parameter vector
    fn index_of(&self, name: &str) -> Option<usize>;

    /// Length of the parameter vector
    fn len(&self) -> usize;

    /// Declared bounds of the named parameter
    fn bounds_of(&self, name: &str) -> Option<Bounds>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An insertion-ordered collection of parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterTable {
    params: IndexMap<String, Parameter>,
}

impl ParameterTable {
    /// Create a new empty parameter table
    ///
    /// # Examples
    ///
    /// ```
    /// use choice_constraints::parameters::ParameterTable;
    ///
    /// let table = ParameterTable::new();
    /// assert!(table.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            params: IndexMap::new(),
        }
    }

    /// Append a parameter to the end of the table
    ///
    /// Fails if a parameter with the same name already exists.
    pub fn add(&mut self, param: Parameter) -> Result<usize, ParameterError> {
        if self.params.contains_key(param.name()) {
            return Err(ParameterError::DuplicateParameter {
                name: param.name().to_string(),
            });
        }
        let (index, _) = self.params.insert_full(param.name().to_string(), param);
        Ok(index)
    }

    /// Append an unbounded parameter with the given name and value
    ///
    /// # Examples
    ///
    /// ```
    /// use choice_constraints::parameters::{ParameterLookup, ParameterTable};
    ///
    /// let mut table = ParameterTable::new();
    /// table.add_param("ASC_BUS", 0.0).unwrap();
    /// table.add_param("tt", -0.1).unwrap();
    /// assert_eq!(table.index_of("tt"), Some(1));
    /// ```
    pub fn add_param(&mut self, name: &str, value: f64) -> Result<usize, ParameterError> {
        self.add(Parameter::new(name, value))
    }

    /// Append a bounded parameter
    pub fn add_param_with_bounds(
        &mut self,
        name: &str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<usize, ParameterError> {
        self.add(Parameter::with_bounds(name, value, min, max)?)
    }

    /// Remove a parameter, shifting later parameters down by one position
    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        self.params.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameter names in vector order
    pub fn names(&self) -> Vec<String> {
        self.params.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.values()
    }

    /// Replace the bounds of a parameter
    pub fn set_bounds(&mut self, name: &str, min: f64, max: f64) -> Result<(), ParameterError> {
        self.params
            .get_mut(name)
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: name.to_string(),
            })?
            .set_bounds(min, max)
    }

    /// Rearrange the table into the given order
    ///
    /// `names` must be a permutation of the current parameter names.
    pub fn reorder<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), ParameterError> {
        if names.len() != self.params.len() {
            return Err(ParameterError::InvalidOrdering {
                message: format!("expected {} names, got {}", self.params.len(), names.len()),
            });
        }

        let mut reordered = IndexMap::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let param = self
                .params
                .get(name)
                .ok_or_else(|| ParameterError::ParameterNotFound {
                    name: name.to_string(),
                })?;
            if reordered.insert(name.to_string(), param.clone()).is_some() {
                return Err(ParameterError::InvalidOrdering {
                    message: format!("'{}' listed more than once", name),
                });
            }
        }

        self.params = reordered;
        Ok(())
    }

    /// Sort the table alphabetically by parameter name
    pub fn sort_by_name(&mut self) {
        self.params.sort_keys();
    }

    /// Current values as a parameter vector
    pub fn values(&self) -> Array1<f64> {
        self.params.values().map(Parameter::value).collect()
    }

    /// Update every parameter from a parameter vector
    ///
    /// All values are checked against their bounds before any is written.
    pub fn set_values(&mut self, values: &Array1<f64>) -> Result<(), ParameterError> {
        if values.len() != self.params.len() {
            return Err(ParameterError::LengthMismatch {
                expected: self.params.len(),
                actual: values.len(),
            });
        }

        let mut updated = self.params.clone();
        for (param, &value) in updated.values_mut().zip(values.iter()) {
            param.set_value(value)?;
        }
        self.params = updated;
        Ok(())
    }

    /// Build a parameter vector from name/value pairs, in table order
    ///
    /// Parameters not named keep their current value.
    pub fn vector_from<'a, I>(&self, values: I) -> Result<Array1<f64>, ParameterError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut x = self.values();
        for (name, value) in values {
            let index = self
                .params
                .get_index_of(name)
                .ok_or_else(|| ParameterError::ParameterNotFound {
                    name: name.to_string(),
                })?;
            x[index] = value;
        }
        Ok(x)
    }

    /// Save the table to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a table from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl ParameterLookup for ParameterTable {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.params.get_index_of(name)
    }

    fn len(&self) -> usize {
        self.params.len()
    }

    fn bounds_of(&self, name: &str) -> Option<Bounds> {
        self.params.get(name).map(Parameter::bounds)
    }
}
