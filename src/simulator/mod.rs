//! The simulator module ties the input modeling and the models together in
//! a `Session`.  A session owns the current uniform sequence and a registry
//! of named variables.  Variables are written by transforming selected
//! uniforms, and read by the queue and inventory simulations.
//!
//! `Session` and `WebSession` are used for Rust- and npm-based projects,
//! respectively.  The `Session` methods use the associated struct types
//! directly, while the `WebSession` provides an interface with better
//! JS/WASM compatibility.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::input_modeling::{
    CalculationStep, IndexSelection, LcgConfig, RandomVariable, UniformDraws,
};
use crate::models::{inventory, queue, InventoryPolicy, InventoryRow, QueueRow};
use crate::utils::errors::SimulationError;

pub mod web;

pub use self::web::Session as WebSession;

/// A request for a named variable: a distribution, and the positions of
/// the uniforms it transforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariateSpec {
    pub distribution: RandomVariable,
    pub indices: IndexSelection,
}

impl VariateSpec {
    pub fn new(distribution: RandomVariable, indices: IndexSelection) -> Self {
        Self {
            distribution,
            indices,
        }
    }
}

/// Everything needed to describe a variable, or to recompute it from the
/// uniform sequence.  The structured parameters and index sets are stored
/// next to their display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableMetadata {
    /// The distribution as applied, after any parameter clamping
    pub distribution: RandomVariable,
    pub parameters: String,
    pub indices: IndexSelection,
    pub index_text: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedVariable {
    name: String,
    values: Vec<f64>,
    metadata: VariableMetadata,
}

impl NamedVariable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn metadata(&self) -> &VariableMetadata {
        &self.metadata
    }

    /// The distribution name, e.g. "Poisson".
    pub fn distribution(&self) -> &'static str {
        self.metadata.distribution.name()
    }
}

/// The uniforms a selection would feed to a distribution, with the compact
/// index text echoed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPreview {
    pub index_text: String,
    pub uniforms: UniformDraws,
}

/// The `Session` struct is the core of simlab, and includes everything
/// needed across a sequence of user requests: the generator configuration,
/// the uniform numbers it produced, and the named variables derived from
/// them.  Each generation call replaces the uniform sequence wholesale.
/// Variables refer to uniforms by position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    generator: Option<LcgConfig>,
    uniforms: Vec<f64>,
    variables: BTreeMap<String, NamedVariable>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a new uniform sequence, replacing the current one.  On
    /// failure the current sequence is kept.
    pub fn generate_uniforms(&mut self, config: &LcgConfig) -> Result<&[f64], SimulationError> {
        self.uniforms = config.generate()?;
        self.generator = Some(config.clone());
        Ok(&self.uniforms)
    }

    /// An accessor method for the current uniform sequence.
    pub fn uniforms(&self) -> &[f64] {
        &self.uniforms
    }

    /// The configuration of the last successful generation, if any.
    pub fn generator(&self) -> Option<&LcgConfig> {
        self.generator.as_ref()
    }

    fn require_uniforms(&self) -> Result<&[f64], SimulationError> {
        if self.uniforms.is_empty() {
            Err(SimulationError::NoUniformNumbers)
        } else {
            Ok(&self.uniforms)
        }
    }

    /// Show which uniforms a selection picks, before generating a variable
    /// from it.  Paired selections must be of equal size.
    pub fn preview_selection(
        &self,
        selection: &IndexSelection,
    ) -> Result<SelectionPreview, SimulationError> {
        let uniforms = self.require_uniforms()?;
        selection.check_pairing()?;
        Ok(SelectionPreview {
            index_text: selection.describe(),
            uniforms: selection.select(uniforms),
        })
    }

    /// Transform the selected uniforms and register the result under
    /// `name`, replacing any variable of the same name.
    pub fn generate_variable(
        &mut self,
        name: &str,
        spec: &VariateSpec,
    ) -> Result<&NamedVariable, SimulationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SimulationError::invalid_parameter(
                "name",
                "a variable needs a non-blank name",
            ));
        }
        let uniforms = self.require_uniforms()?;
        spec.indices.check_pairing()?;
        let variates = spec
            .distribution
            .transform(&spec.indices.select(uniforms))?;
        let variable = NamedVariable {
            name: name.to_string(),
            metadata: VariableMetadata {
                distribution: variates.metadata.distribution,
                parameters: variates.metadata.parameters,
                indices: spec.indices.clone(),
                index_text: spec.indices.describe(),
                count: variates.values.len(),
            },
            values: variates.values,
        };
        debug!(
            name,
            distribution = variable.distribution(),
            count = variable.values.len(),
            "registered variable"
        );
        let registered: &NamedVariable = match self.variables.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                warn!(name, "replacing existing variable");
                entry.insert(variable);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(variable),
        };
        Ok(registered)
    }

    /// An accessor method for a variable, by name.
    pub fn variable(&self, name: &str) -> Result<&NamedVariable, SimulationError> {
        self.variables
            .get(name.trim())
            .ok_or_else(|| SimulationError::VariableNotFound(name.to_string()))
    }

    /// All registered variables, ordered by name.
    pub fn variables(&self) -> impl Iterator<Item = &NamedVariable> {
        self.variables.values()
    }

    /// Recompute a variable step by step, from its stored parameters and the
    /// uniforms currently at its positions.
    pub fn calculation_trace(&self, name: &str) -> Result<Vec<CalculationStep>, SimulationError> {
        let metadata = self.variable(name)?.metadata();
        let uniforms = self.require_uniforms()?;
        metadata
            .distribution
            .trace(&metadata.indices.select(uniforms))
    }

    /// Run the queue table with two registered variables, one holding
    /// inter-arrival times and the other service times.
    pub fn simulate_queue(
        &self,
        arrivals: &str,
        services: &str,
    ) -> Result<Vec<QueueRow>, SimulationError> {
        let arrivals = self.variable(arrivals)?;
        let services = self.variable(services)?;
        Ok(queue::simulate(arrivals.values(), services.values()))
    }

    /// Run the inventory table with a registered demand variable.
    pub fn simulate_inventory(
        &self,
        demand: &str,
        policy: &InventoryPolicy,
    ) -> Result<Vec<InventoryRow>, SimulationError> {
        let demand = self.variable(demand)?;
        Ok(inventory::simulate(demand.values(), policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let mut session = Session::new();
        session
            .generate_uniforms(&LcgConfig::mixed(7, 5, 3, 16, 8))
            .unwrap();
        session
    }

    fn exponential(indices: &str) -> VariateSpec {
        VariateSpec::new(
            RandomVariable::Exponential { lambda: 2.0 },
            IndexSelection::single(indices).unwrap(),
        )
    }

    #[test]
    fn variables_need_uniforms_first() {
        let mut session = Session::new();
        assert!(matches!(
            session.generate_variable("x", &exponential("1-3")),
            Err(SimulationError::NoUniformNumbers)
        ));
    }

    #[test]
    fn variables_need_a_name() {
        assert!(matches!(
            session().generate_variable("  ", &exponential("1-3")),
            Err(SimulationError::InvalidParameter {
                parameter: "name",
                ..
            })
        ));
    }

    #[test]
    fn generation_replaces_the_sequence() {
        let mut session = session();
        assert_eq!(session.uniforms().len(), 8);
        session
            .generate_uniforms(&LcgConfig::multiplicative(3, 7, 11, 3))
            .unwrap();
        assert_eq!(session.uniforms(), &[10.0 / 11.0, 4.0 / 11.0, 6.0 / 11.0]);
        assert!(session
            .generate_uniforms(&LcgConfig::multiplicative(3, 7, 0, 3))
            .is_err());
        assert_eq!(session.uniforms().len(), 3);
        assert_eq!(session.generator().unwrap().modulus, 11);
    }

    #[test]
    fn variable_records_its_metadata() {
        let mut session = session();
        let variable = session.generate_variable("arrivals", &exponential("3, 1-2, 6-7")).unwrap();
        assert_eq!(variable.name(), "arrivals");
        assert_eq!(variable.distribution(), "Exponential");
        assert_eq!(variable.metadata().parameters, "λ=2");
        assert_eq!(variable.metadata().index_text, "U=1-3, 6-7");
        assert_eq!(variable.metadata().count, 5);
        assert_eq!(variable.values().len(), 5);
    }

    #[test]
    fn selection_past_the_sequence_truncates() {
        let mut session = session();
        let variable = session.generate_variable("x", &exponential("6-20")).unwrap();
        assert_eq!(variable.values().len(), 3);
        assert!(matches!(
            session.generate_variable("y", &exponential("9-20")),
            Err(SimulationError::EmptySelection)
        ));
    }

    #[test]
    fn same_name_replaces_the_variable() {
        let mut session = session();
        session.generate_variable("x", &exponential("1-2")).unwrap();
        session.generate_variable("x", &exponential("1-5")).unwrap();
        assert_eq!(session.variables().count(), 1);
        assert_eq!(session.variable("x").unwrap().values().len(), 5);
    }

    #[test]
    fn normal_pairs_must_match_before_truncation() {
        let mut session = session();
        let spec = VariateSpec::new(
            RandomVariable::Normal {
                mean: 0.0,
                std_dev: 1.0,
            },
            IndexSelection::paired("1-3", "4-5").unwrap(),
        );
        assert!(matches!(
            session.generate_variable("z", &spec),
            Err(SimulationError::MismatchedPairing { .. })
        ));
        assert!(session.preview_selection(&spec.indices).is_err());
    }

    #[test]
    fn preview_echoes_compact_indices() {
        let preview = session()
            .preview_selection(&IndexSelection::single("2, 1, 3").unwrap())
            .unwrap();
        assert_eq!(preview.index_text, "U=1-3");
        assert_eq!(
            preview.uniforms,
            UniformDraws::Single(vec![6.0 / 16.0, 1.0 / 16.0, 8.0 / 16.0])
        );
    }

    #[test]
    fn trace_follows_stored_parameters() {
        let mut session = session();
        let values = session
            .generate_variable("x", &exponential("1-4"))
            .unwrap()
            .values()
            .to_vec();
        let traced: Vec<f64> = session
            .calculation_trace("x")
            .unwrap()
            .iter()
            .map(CalculationStep::value)
            .collect();
        assert_eq!(values, traced);
    }

    #[test]
    fn simulations_read_registered_variables() {
        let mut session = session();
        session.generate_variable("a", &exponential("1-4")).unwrap();
        session.generate_variable("s", &exponential("5-6")).unwrap();
        assert_eq!(session.simulate_queue("a", "s").unwrap().len(), 2);
        assert!(matches!(
            session.simulate_queue("a", "missing"),
            Err(SimulationError::VariableNotFound(_))
        ));
        let policy = InventoryPolicy {
            opening_inventory: 1.0,
            order_quantity: 1.0,
            reorder_period: 2,
            capacity: 3.0,
            order_cost: 1.0,
            holding_cost: 1.0,
            shortage_cost: 1.0,
        };
        assert_eq!(session.simulate_inventory("a", &policy).unwrap().len(), 4);
    }
}
