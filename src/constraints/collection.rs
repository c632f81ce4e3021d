//! Ordered, duplicate-aware container of constraints
//!
//! A [`ConstraintCollection`] keeps every stored constraint linked against the
//! parameter table it was last given. It never holds the table itself, so each
//! mutating call takes the table as an argument and the owner decides when to
//! relink (see [`ConstrainedModel`](crate::model::ConstrainedModel)).

use crate::constraints::config::ConstraintConfig;
use crate::constraints::error::ConstraintError;
use crate::constraints::solver::{LinearConstraint, NonlinearConstraint};
use crate::constraints::{
    check_scale, interpret, Constraint, FixedBound, OrderingBound, ParametricConstraint,
    RatioBound,
};
use crate::parameters::ParameterLookup;
use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Something that can be stored in a collection
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintItem {
    /// An already-built constraint, stored as given
    Constraint(Constraint),
    /// A constraint expression, parsed with the collection's defaults
    Text(String),
}

impl ConstraintItem {
    /// Resolve into a constraint
    ///
    /// Text is parsed with [`interpret`] and receives the configured scale and
    /// binding tolerance.
    pub fn into_constraint(self, config: &ConstraintConfig) -> Result<Constraint, ConstraintError> {
        match self {
            Self::Constraint(c) => Ok(c),
            Self::Text(text) => Ok(interpret(&text)?
                .with_scale(config.default_scale)
                .with_binding_tol(config.binding_tol)),
        }
    }
}

impl From<Constraint> for ConstraintItem {
    fn from(c: Constraint) -> Self {
        Self::Constraint(c)
    }
}

impl From<FixedBound> for ConstraintItem {
    fn from(c: FixedBound) -> Self {
        Self::Constraint(c.into())
    }
}

impl From<OrderingBound> for ConstraintItem {
    fn from(c: OrderingBound) -> Self {
        Self::Constraint(c.into())
    }
}

impl From<RatioBound> for ConstraintItem {
    fn from(c: RatioBound) -> Self {
        Self::Constraint(c.into())
    }
}

impl From<&str> for ConstraintItem {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ConstraintItem {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl TryFrom<serde_json::Value> for ConstraintItem {
    type Error = ConstraintError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::String(text) => Ok(Self::Text(text)),
            serde_json::Value::Object(_) => serde_json::from_value::<Constraint>(value)
                .map(Self::Constraint)
                .map_err(|e| ConstraintError::InvalidItem {
                    message: e.to_string(),
                }),
            other => Err(ConstraintError::InvalidItem {
                message: format!("expected a constraint or a string, got {}", other),
            }),
        }
    }
}

/// Outcome of a mutating call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Applied,
    /// An equal constraint was already stored; nothing changed
    SkippedDuplicate,
}

impl Mutation {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Ordered sequence of constraints linked to one parameter table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintCollection {
    constraints: Vec<Constraint>,
    #[serde(default)]
    config: ConstraintConfig,
    #[serde(skip)]
    n_params: usize,
}

impl ConstraintCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ConstraintConfig) -> Self {
        Self {
            constraints: Vec::new(),
            config,
            n_params: 0,
        }
    }

    /// Build a collection from items and link it against `table`
    pub fn from_constraints<I, T>(
        items: I,
        table: &dyn ParameterLookup,
        config: ConstraintConfig,
    ) -> Result<Self, ConstraintError>
    where
        I: IntoIterator<Item = T>,
        T: Into<ConstraintItem>,
    {
        let mut collection = Self::with_config(config);
        collection.replace_all(items, table)?;
        Ok(collection)
    }

    pub fn config(&self) -> &ConstraintConfig {
        &self.config
    }

    pub fn allow_dupes(&self) -> bool {
        self.config.allow_dupes
    }

    /// Existing entries are kept when duplicates are disallowed again.
    pub fn set_allow_dupes(&mut self, allow: bool) {
        self.config.allow_dupes = allow;
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Length of the parameter vector the collection was last linked against
    pub fn n_params(&self) -> usize {
        self.n_params
    }

    pub fn get(&self, index: usize) -> Option<&Constraint> {
        self.constraints.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    /// Whether a structurally equal constraint is stored
    pub fn contains(&self, constraint: &Constraint) -> bool {
        self.constraints.contains(constraint)
    }

    /// Insert at `index`, shifting later entries
    ///
    /// Every stored constraint, the new one included, is relinked against
    /// `table`. Nothing changes if any of them fails to link. Unless
    /// duplicates are allowed, an item equal to a stored constraint is
    /// silently skipped.
    pub fn insert(
        &mut self,
        index: usize,
        item: impl Into<ConstraintItem>,
        table: &dyn ParameterLookup,
    ) -> Result<Mutation, ConstraintError> {
        if index > self.len() {
            return Err(ConstraintError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let Some(constraint) = self.prepare(item.into())? else {
            return Ok(Mutation::SkippedDuplicate);
        };
        let mut candidate = self.constraints.clone();
        candidate.insert(index, constraint);
        self.commit(candidate, table)?;
        Ok(Mutation::Applied)
    }

    /// Append at the end
    pub fn push(
        &mut self,
        item: impl Into<ConstraintItem>,
        table: &dyn ParameterLookup,
    ) -> Result<Mutation, ConstraintError> {
        self.insert(self.len(), item, table)
    }

    /// Replace the constraint at `index`, relinking the whole collection
    pub fn set(
        &mut self,
        index: usize,
        item: impl Into<ConstraintItem>,
        table: &dyn ParameterLookup,
    ) -> Result<Mutation, ConstraintError> {
        if index >= self.len() {
            return Err(ConstraintError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let Some(constraint) = self.prepare(item.into())? else {
            return Ok(Mutation::SkippedDuplicate);
        };
        let mut candidate = self.constraints.clone();
        candidate[index] = constraint;
        self.commit(candidate, table)?;
        Ok(Mutation::Applied)
    }

    /// Remove and return the constraint at `index`
    pub fn remove(&mut self, index: usize) -> Result<Constraint, ConstraintError> {
        if index >= self.len() {
            return Err(ConstraintError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(self.constraints.remove(index))
    }

    /// Replace the whole contents
    ///
    /// Every item is resolved and linked first. If any fails the collection is
    /// left unchanged. Equal items are collapsed unless duplicates are allowed.
    pub fn replace_all<I, T>(
        &mut self,
        items: I,
        table: &dyn ParameterLookup,
    ) -> Result<(), ConstraintError>
    where
        I: IntoIterator<Item = T>,
        T: Into<ConstraintItem>,
    {
        let mut replacement: Vec<Constraint> = Vec::new();
        for item in items {
            let mut constraint = item.into().into_constraint(&self.config)?;
            if !self.config.allow_dupes && replacement.contains(&constraint) {
                log::debug!("skipping duplicate constraint '{}'", constraint);
                continue;
            }
            constraint.link(table, None)?;
            replacement.push(constraint);
        }
        self.constraints = replacement;
        self.n_params = table.len();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.constraints.clear();
    }

    /// Relink every constraint against the current layout of `table`
    ///
    /// Order, names and literal bounds are kept. Only positions and
    /// sign-dependent coefficients are recomputed. If any constraint fails to
    /// link, none of them change.
    pub fn relink(&mut self, table: &dyn ParameterLookup) -> Result<(), ConstraintError> {
        self.commit(self.constraints.clone(), table)?;
        log::debug!(
            "relinked {} constraints over {} parameters",
            self.len(),
            self.n_params
        );
        Ok(())
    }

    /// Relink with a new scale, for one constraint or all of them
    ///
    /// When `scale` is `None` every affected constraint gets its own draw of
    /// `exp(u)`, with `u` uniform on `[-r, r]` and `r` the configured
    /// `rescale_log_range`. All draws come from `rng`.
    pub fn rescale<R>(
        &mut self,
        table: &dyn ParameterLookup,
        scale: Option<f64>,
        index: Option<usize>,
        rng: &mut R,
    ) -> Result<(), ConstraintError>
    where
        R: Rng + ?Sized,
    {
        let range = self.config.rescale_log_range;
        if scale.is_none() && !(range.is_finite() && range >= 0.0) {
            return Err(ConstraintError::InvalidScale { scale: range });
        }
        if let Some(s) = scale {
            check_scale(s)?;
        }
        let positions = match index {
            Some(i) if i >= self.len() => {
                return Err(ConstraintError::IndexOutOfRange {
                    index: i,
                    len: self.len(),
                })
            }
            Some(i) => i..i + 1,
            None => 0..self.len(),
        };

        let mut rescaled = self.constraints.clone();
        for i in positions {
            let s = match scale {
                Some(s) => s,
                None => rng.gen_range(-range..=range).exp(),
            };
            rescaled[i].link(table, Some(s))?;
            log::debug!("rescaled constraint {} '{}' to {}", i, rescaled[i], s);
        }
        self.constraints = rescaled;
        self.n_params = table.len();
        Ok(())
    }

    /// Names referenced by any constraint, first occurrence first
    pub fn parameter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.constraints.iter().flat_map(|c| c.parameters()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// First constraint that references `name`
    pub fn references(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.references(name))
    }

    /// Inequality records for a nonlinear solver, in collection order
    pub fn nonlinear_constraints(&self) -> Result<Vec<NonlinearConstraint>, ConstraintError> {
        let mut records = Vec::with_capacity(self.len());
        for constraint in &self.constraints {
            records.extend(constraint.as_nonlinear()?);
        }
        Ok(records)
    }

    /// Every linear form stacked into one block, in collection order
    pub fn linear_constraint(&self) -> Result<LinearConstraint, ConstraintError> {
        let parts = self
            .constraints
            .iter()
            .map(|c| c.linear_form())
            .collect::<Result<Vec<_>, _>>()?;
        LinearConstraint::stack(&parts, self.n_params)
    }

    /// `(position, note)` for every constraint binding at `x`
    pub fn binding(&self, x: &Array1<f64>) -> Result<Vec<(usize, String)>, ConstraintError> {
        let mut notes = Vec::new();
        for (i, constraint) in self.constraints.iter().enumerate() {
            if constraint.is_binding(x)? {
                notes.push((i, constraint.binding_note(x)?));
            }
        }
        Ok(notes)
    }

    /// Whether every constraint value is at least `-tol` at `x`
    pub fn all_satisfied(&self, x: &Array1<f64>, tol: f64) -> Result<bool, ConstraintError> {
        Ok(self.violated(x, tol)?.is_empty())
    }

    /// Positions of constraints whose value is below `-tol` at `x`
    pub fn violated(&self, x: &Array1<f64>, tol: f64) -> Result<Vec<usize>, ConstraintError> {
        let mut positions = Vec::new();
        for (i, constraint) in self.constraints.iter().enumerate() {
            if constraint.fun(x)? < -tol {
                positions.push(i);
            }
        }
        Ok(positions)
    }

    /// Load from a JSON array and link against `table`
    ///
    /// Elements may be constraint strings or tagged constraint objects.
    pub fn from_json(
        json: &str,
        table: &dyn ParameterLookup,
        config: ConstraintConfig,
    ) -> crate::error::Result<Self> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let items = values
            .into_iter()
            .map(ConstraintItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_constraints(items, table, config)?)
    }

    /// Serialize the constraints as a JSON array of tagged objects
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.constraints)
    }

    /// Resolve an item, or `None` if it duplicates a stored constraint
    fn prepare(&self, item: ConstraintItem) -> Result<Option<Constraint>, ConstraintError> {
        let constraint = item.into_constraint(&self.config)?;
        if !self.config.allow_dupes && self.contains(&constraint) {
            log::debug!("skipping duplicate constraint '{}'", constraint);
            return Ok(None);
        }
        Ok(Some(constraint))
    }

    /// Link every candidate against `table` and store them only if all succeed
    fn commit(
        &mut self,
        mut candidate: Vec<Constraint>,
        table: &dyn ParameterLookup,
    ) -> Result<(), ConstraintError> {
        for constraint in candidate.iter_mut() {
            constraint.link(table, None)?;
        }
        self.constraints = candidate;
        self.n_params = table.len();
        Ok(())
    }
}

impl Index<usize> for ConstraintCollection {
    type Output = Constraint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.constraints[index]
    }
}

impl<'a> IntoIterator for &'a ConstraintCollection {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}
