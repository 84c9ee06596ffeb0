use js_sys::Array;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::input_modeling::LcgConfig;
use crate::models::InventoryPolicy;
use crate::utils::errors::SimulationError;
use crate::utils::set_panic_hook;

use super::{Session as CoreSession, VariateSpec};

fn js_error(error: SimulationError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// The web `Session` provides JS/WASM-compatible interfaces to the core
/// `Session` struct.  For additional insight on these methods, refer to the
/// associated core `Session` methods.  Configuration comes in as JSON or
/// YAML text, results go out the same way, and errors are returned to JS
/// as their display message.
#[wasm_bindgen]
#[derive(Default, Serialize, Deserialize)]
pub struct Session {
    session: CoreSession,
}

#[wasm_bindgen]
impl Session {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        set_panic_hook();
        Self::default()
    }

    /// A JS/WASM interface for `Session.generate_uniforms`, which uses a
    /// JSON representation of the generator configuration, and returns the
    /// uniform numbers as a JSON array.
    pub fn generate_uniforms_json(&mut self, config: &str) -> Result<String, JsValue> {
        self.generate_uniforms_with(config, |text| Ok(serde_json::from_str(text)?))
            .and_then(|uniforms| Ok(serde_json::to_string(&uniforms)?))
            .map_err(js_error)
    }

    /// A JS/WASM interface for `Session.generate_uniforms`, which uses a
    /// YAML representation of the generator configuration.
    pub fn generate_uniforms_yaml(&mut self, config: &str) -> Result<String, JsValue> {
        self.generate_uniforms_with(config, |text| Ok(serde_yaml::from_str(text)?))
            .and_then(|uniforms| Ok(serde_yaml::to_string(&uniforms)?))
            .map_err(js_error)
    }

    /// Get the current uniform sequence, as a JSON array.
    pub fn get_uniforms_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.uniforms()).map_err(|error| js_error(error.into()))
    }

    /// A JS/WASM interface for `Session.generate_variable`, which uses a
    /// JSON representation of the variate specification, and returns the
    /// registered variable as JSON.
    pub fn generate_variable_json(&mut self, name: &str, spec: &str) -> Result<String, JsValue> {
        let spec: VariateSpec = serde_json::from_str(spec).map_err(|error| js_error(error.into()))?;
        self.session
            .generate_variable(name, &spec)
            .and_then(|variable| Ok(serde_json::to_string(variable)?))
            .map_err(js_error)
    }

    /// A JS/WASM interface for `Session.generate_variable`, which uses a
    /// YAML representation of the variate specification.
    pub fn generate_variable_yaml(&mut self, name: &str, spec: &str) -> Result<String, JsValue> {
        let spec: VariateSpec = serde_yaml::from_str(spec).map_err(|error| js_error(error.into()))?;
        self.session
            .generate_variable(name, &spec)
            .and_then(|variable| Ok(serde_yaml::to_string(variable)?))
            .map_err(js_error)
    }

    /// A JS/WASM interface for `Session.variables`, which converts the
    /// registered variables to a JSON array.
    pub fn get_variables_json(&self) -> Result<String, JsValue> {
        let variables: Vec<_> = self.session.variables().collect();
        serde_json::to_string(&variables).map_err(|error| js_error(error.into()))
    }

    /// A JS/WASM interface for `Session.calculation_trace`, as JSON.
    pub fn calculation_trace_json(&self, name: &str) -> Result<String, JsValue> {
        self.session
            .calculation_trace(name)
            .and_then(|steps| Ok(serde_json::to_string(&steps)?))
            .map_err(js_error)
    }

    /// A JS/WASM interface for `Session.simulate_queue`, which converts the
    /// returned rows to a JSON string.
    pub fn simulate_queue_json(&self, arrivals: &str, services: &str) -> Result<String, JsValue> {
        self.session
            .simulate_queue(arrivals, services)
            .and_then(|rows| Ok(serde_json::to_string(&rows)?))
            .map_err(js_error)
    }

    /// A JS/WASM interface for `Session.simulate_queue`, which converts the
    /// returned rows to a JavaScript Array.
    pub fn simulate_queue_js(&self, arrivals: &str, services: &str) -> Result<Array, JsValue> {
        Ok(self
            .session
            .simulate_queue(arrivals, services)
            .map_err(js_error)?
            .into_iter()
            .map(JsValue::from)
            .collect())
    }

    /// A JS/WASM interface for `Session.simulate_inventory`, which uses a
    /// JSON representation of the inventory policy, and converts the
    /// returned rows to a JSON string.
    pub fn simulate_inventory_json(&self, demand: &str, policy: &str) -> Result<String, JsValue> {
        let policy: InventoryPolicy =
            serde_json::from_str(policy).map_err(|error| js_error(error.into()))?;
        self.session
            .simulate_inventory(demand, &policy)
            .and_then(|rows| Ok(serde_json::to_string(&rows)?))
            .map_err(js_error)
    }

    /// A JS/WASM interface for `Session.simulate_inventory`, which uses a
    /// YAML representation of the inventory policy.
    pub fn simulate_inventory_yaml(&self, demand: &str, policy: &str) -> Result<String, JsValue> {
        let policy: InventoryPolicy =
            serde_yaml::from_str(policy).map_err(|error| js_error(error.into()))?;
        self.session
            .simulate_inventory(demand, &policy)
            .and_then(|rows| Ok(serde_yaml::to_string(&rows)?))
            .map_err(js_error)
    }

    /// A JS/WASM interface for `Session.simulate_inventory`, which converts
    /// the returned rows to a JavaScript Array.
    pub fn simulate_inventory_js(&self, demand: &str, policy: &str) -> Result<Array, JsValue> {
        let policy: InventoryPolicy =
            serde_json::from_str(policy).map_err(|error| js_error(error.into()))?;
        Ok(self
            .session
            .simulate_inventory(demand, &policy)
            .map_err(js_error)?
            .into_iter()
            .map(JsValue::from)
            .collect())
    }

    /// Get a JSON representation of the full session state.
    pub fn get_json(&self) -> Result<String, JsValue> {
        serde_json::to_string_pretty(&self.session).map_err(|error| js_error(error.into()))
    }
}

impl Session {
    fn generate_uniforms_with(
        &mut self,
        config: &str,
        parse: impl Fn(&str) -> Result<LcgConfig, SimulationError>,
    ) -> Result<Vec<f64>, SimulationError> {
        let config = parse(config)?;
        Ok(self.session.generate_uniforms(&config)?.to_vec())
    }
}
