//! Persistence records
//!
//! A solver is saved as its formula text plus one record per entity. Restoring
//! re-compiles the formula and re-applies the saved values, so weightings in a
//! record are informational.

use crate::compiler::CompileOptions;
use crate::error::{Error, Result};
use crate::solver::WeightSolver;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityRecord {
    pub name: String,
    pub weighting: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormulaRecord {
    pub formula: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub entities: Vec<EntityRecord>,
}

impl WeightSolver {
    pub fn to_record(&self) -> FormulaRecord {
        FormulaRecord {
            formula: self.formula().to_string(),
            entities: self
                .entities()
                .iter()
                .map(|e| EntityRecord {
                    name: e.name().to_string(),
                    weighting: e.weighting(),
                    value: e.value(),
                })
                .collect(),
        }
    }

    /// Re-compile the saved formula and apply the saved values.
    ///
    /// A saved name the formula no longer produces is an error.
    pub fn from_record(record: &FormulaRecord, options: &CompileOptions) -> Result<Self> {
        let mut solver = WeightSolver::from_formula(&record.formula, options)?;
        for entity in &record.entities {
            if solver.get(&entity.name).is_none() {
                return Err(Error::UnknownEntity(entity.name.clone()));
            }
            if let Some(value) = entity.value {
                solver.set_value(&entity.name, value)?;
            }
        }
        Ok(solver)
    }
}
