//! Owner of a parameter table and its constraints.
//!
//! [`ConstrainedModel`] keeps a [`ParameterTable`] and a
//! [`ConstraintCollection`] side by side. Every mutation goes through an
//! explicit method that relinks the constraints against the new table layout
//! and marks any optimizer state derived from the model as stale.

use crate::constraints::{
    ConstraintCollection, ConstraintConfig, ConstraintError, ConstraintItem, LinearConstraint,
    Mutation, NonlinearConstraint,
};
use crate::error::Result;
use crate::parameters::{Parameter, ParameterError, ParameterTable};
use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A parameter table together with the constraints placed on it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstrainedModel {
    parameters: ParameterTable,
    constraints: ConstraintCollection,
    #[serde(skip)]
    stale: bool,
    #[serde(skip)]
    revision: u64,
}

impl ConstrainedModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty model whose collection uses `config`
    pub fn with_config(config: ConstraintConfig) -> Self {
        Self {
            constraints: ConstraintCollection::with_config(config),
            ..Self::default()
        }
    }

    /// Wrap an existing table
    pub fn from_parameters(parameters: ParameterTable) -> Self {
        Self {
            parameters,
            ..Self::default()
        }
    }

    pub fn parameters(&self) -> &ParameterTable {
        &self.parameters
    }

    pub fn constraints(&self) -> &ConstraintCollection {
        &self.constraints
    }

    /// Current parameter values in table order
    pub fn values(&self) -> Array1<f64> {
        self.parameters.values()
    }

    /// Whether optimizer state derived from the model must be rebuilt
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Number of times the model has been marked stale
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
        self.revision += 1;
        log::debug!("model marked stale at revision {}", self.revision);
    }

    /// Record that derived state has been rebuilt
    pub fn mark_fresh(&mut self) {
        self.stale = false;
    }

    // Parameter mutations

    /// Append a parameter and return its position
    pub fn add_parameter(&mut self, param: Parameter) -> Result<usize> {
        let index = self.parameters.add(param)?;
        self.constraints.relink(&self.parameters)?;
        self.mark_stale();
        Ok(index)
    }

    /// Remove a parameter that no constraint references
    pub fn remove_parameter(&mut self, name: &str) -> Result<Parameter> {
        if let Some(constraint) = self.constraints.references(name) {
            return Err(ConstraintError::ParameterInUse {
                name: name.to_string(),
                constraint: constraint.to_string(),
            }
            .into());
        }
        let previous = self.parameters.clone();
        let removed = self
            .parameters
            .remove(name)
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: name.to_string(),
            })?;
        self.relink_or_restore(previous)?;
        Ok(removed)
    }

    /// Rearrange the parameter table
    ///
    /// `names` must be a permutation of the current parameter names.
    pub fn reorder_parameters<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let previous = self.parameters.clone();
        self.parameters.reorder(names)?;
        self.relink_or_restore(previous)
    }

    /// Replace the bounds of a parameter
    ///
    /// Fails, leaving the old bounds in place, if a ratio constraint can no
    /// longer determine the sign of its denominator.
    pub fn set_parameter_bounds(&mut self, name: &str, min: f64, max: f64) -> Result<()> {
        let previous = self.parameters.clone();
        self.parameters.set_bounds(name, min, max)?;
        self.relink_or_restore(previous)
    }

    fn relink_or_restore(&mut self, previous: ParameterTable) -> Result<()> {
        if let Err(e) = self.constraints.relink(&self.parameters) {
            self.parameters = previous;
            return Err(e.into());
        }
        self.mark_stale();
        Ok(())
    }

    // Constraint mutations

    pub fn insert_constraint(
        &mut self,
        index: usize,
        item: impl Into<ConstraintItem>,
    ) -> Result<Mutation> {
        let outcome = self.constraints.insert(index, item, &self.parameters)?;
        self.applied(outcome)
    }

    pub fn push_constraint(&mut self, item: impl Into<ConstraintItem>) -> Result<Mutation> {
        let outcome = self.constraints.push(item, &self.parameters)?;
        self.applied(outcome)
    }

    pub fn set_constraint(
        &mut self,
        index: usize,
        item: impl Into<ConstraintItem>,
    ) -> Result<Mutation> {
        let outcome = self.constraints.set(index, item, &self.parameters)?;
        self.applied(outcome)
    }

    pub fn remove_constraint(&mut self, index: usize) -> Result<()> {
        self.constraints.remove(index)?;
        self.mark_stale();
        Ok(())
    }

    /// Replace every constraint at once
    pub fn set_constraints<I, T>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<ConstraintItem>,
    {
        self.constraints.replace_all(items, &self.parameters)?;
        self.mark_stale();
        Ok(())
    }

    pub fn clear_constraints(&mut self) {
        self.constraints.clear();
        self.mark_stale();
    }

    /// See [`ConstraintCollection::rescale`]
    pub fn rescale_constraints<R>(
        &mut self,
        scale: Option<f64>,
        index: Option<usize>,
        rng: &mut R,
    ) -> Result<()>
    where
        R: Rng + ?Sized,
    {
        self.constraints
            .rescale(&self.parameters, scale, index, rng)?;
        self.mark_stale();
        Ok(())
    }

    fn applied(&mut self, outcome: Mutation) -> Result<Mutation> {
        if outcome.is_applied() {
            self.mark_stale();
        }
        Ok(outcome)
    }

    // Solver surfaces

    pub fn nonlinear_constraints(&self) -> Result<Vec<NonlinearConstraint>> {
        Ok(self.constraints.nonlinear_constraints()?)
    }

    pub fn linear_constraint(&self) -> Result<LinearConstraint> {
        Ok(self.constraints.linear_constraint()?)
    }

    /// `(position, note)` for every constraint binding at `x`
    pub fn binding_constraints(&self, x: &Array1<f64>) -> Result<Vec<(usize, String)>> {
        Ok(self.constraints.binding(x)?)
    }

    /// Serialize the model to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a model from JSON and link its constraints
    pub fn from_json(json: &str) -> Result<Self> {
        let mut model: Self = serde_json::from_str(json)?;
        model.constraints.relink(&model.parameters)?;
        model.mark_stale();
        Ok(model)
    }
}
