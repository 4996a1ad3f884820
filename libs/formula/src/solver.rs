//! Weighted average over compiled grade entities
//!
//! A [`WeightSolver`] owns the entities of one formula. Values are set and
//! cleared per entity; the solver computes the weighted mean of whatever is
//! set and can invert that mean for a single unknown entity.

use crate::compiler::{compile, CompileOptions, CompiledFormula};
use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::debug;

/// A named grade with its integer weighting and optional value
#[derive(Clone, Debug, PartialEq)]
pub struct GradeEntity {
    name: String,
    weighting: u64,
    value: Option<f64>,
}

impl GradeEntity {
    pub fn new(name: impl Into<String>, weighting: u64) -> Self {
        Self {
            name: name.into(),
            weighting,
            value: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weighting(&self) -> u64 {
        self.weighting
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = Some(value);
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// Entities of one formula, addressed by name
#[derive(Clone, Debug, PartialEq)]
pub struct WeightSolver {
    formula: String,
    entities: Vec<GradeEntity>,
    index: HashMap<String, usize>,
}

impl WeightSolver {
    /// Compile `formula` and wrap its entities
    pub fn from_formula(formula: &str, options: &CompileOptions) -> Result<Self> {
        let compiled = compile(formula, options)?;
        Ok(Self::new(formula, compiled))
    }

    pub fn new(formula: impl Into<String>, compiled: CompiledFormula) -> Self {
        Self::from_entities(formula, compiled.entities)
    }

    /// Build a solver from entities that are already weighted.
    ///
    /// Later entities with a name seen before are dropped.
    pub fn from_entities(formula: impl Into<String>, entities: Vec<GradeEntity>) -> Self {
        let mut unique = Vec::with_capacity(entities.len());
        let mut index = HashMap::with_capacity(entities.len());
        for entity in entities {
            if index.contains_key(entity.name()) {
                continue;
            }
            index.insert(entity.name().to_string(), unique.len());
            unique.push(entity);
        }

        Self {
            formula: formula.into(),
            entities: unique,
            index,
        }
    }

    /// The formula text the entities were compiled from
    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn entities(&self) -> &[GradeEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&GradeEntity> {
        self.index.get(name).map(|&i| &self.entities[i])
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut GradeEntity> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.entities[i]),
            None => Err(Error::UnknownEntity(name.to_string())),
        }
    }

    pub fn set_value(&mut self, name: &str, value: f64) -> Result<()> {
        self.get_mut(name)?.set_value(value);
        debug!(name, value, "value set");
        Ok(())
    }

    pub fn reset(&mut self, name: &str) -> Result<()> {
        self.get_mut(name)?.reset();
        debug!(name, "value reset");
        Ok(())
    }

    /// Clear every value
    pub fn reset_all(&mut self) {
        self.entities.iter_mut().for_each(GradeEntity::reset);
    }

    /// Sum of all weightings
    pub fn total_weighting(&self) -> u64 {
        self.entities.iter().map(GradeEntity::weighting).sum()
    }

    /// Sum of the weightings of entities that have a value
    pub fn set_weighting(&self) -> u64 {
        self.entities
            .iter()
            .filter(|e| e.has_value())
            .map(GradeEntity::weighting)
            .sum()
    }

    /// True once every entity has a value
    pub fn is_complete(&self) -> bool {
        self.entities.iter().all(GradeEntity::has_value)
    }

    /// Weighted mean of the set values, `0.0` when nothing is set
    pub fn average(&self) -> f64 {
        let (sum, weight) = self.weighted_sum(None);
        if weight == 0.0 {
            return 0.0;
        }
        sum / weight
    }

    /// Value `name` must take so that the average becomes `target`.
    ///
    /// The entity's own current value is ignored.
    pub fn solve_for(&self, name: &str, target: f64) -> Result<f64> {
        let entity = self
            .get(name)
            .ok_or_else(|| Error::UnknownEntity(name.to_string()))?;
        if entity.weighting() == 0 {
            return Err(Error::DivisionByZero);
        }

        let own = entity.weighting() as f64;
        let (sum, weight) = self.weighted_sum(Some(name));
        let value = (target * (own + weight) - sum) / own;
        debug!(name, target, value, "solved");
        Ok(value)
    }

    /// `(Σ value·weighting, Σ weighting)` over set entities, skipping `except`
    fn weighted_sum(&self, except: Option<&str>) -> (f64, f64) {
        self.entities
            .iter()
            .filter(|e| Some(e.name()) != except)
            .filter_map(|e| e.value().map(|v| (v, e.weighting() as f64)))
            .fold((0.0, 0.0), |(sum, weight), (v, w)| (sum + v * w, weight + w))
    }
}
