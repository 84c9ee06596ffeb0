use simlab::simulator::WebSession;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

fn session() -> WebSession {
    let mut session = WebSession::new();
    let uniforms = r#"
{
    "seed": 7,
    "multiplier": 5,
    "increment": 3,
    "modulus": 16,
    "count": 8,
    "variant": "mixed"
}"#;
    session.generate_uniforms_json(uniforms).unwrap();
    session
}

#[test]
#[wasm_bindgen_test]
fn uniforms_follow_the_mixed_recurrence() {
    let session = session();
    let uniforms: Vec<f64> = serde_json::from_str(&session.get_uniforms_json().unwrap()).unwrap();
    assert_eq!(
        uniforms,
        vec![0.375, 0.0625, 0.5, 0.6875, 0.625, 0.3125, 0.75, 0.9375]
    );
}

#[test]
#[wasm_bindgen_test]
fn yaml_generator_configuration() {
    let mut session = WebSession::new();
    let config = r#"
seed: 3
multiplier: 7
modulus: 11
count: 3
variant: multiplicative
"#;
    let uniforms: Vec<f64> =
        serde_yaml::from_str(&session.generate_uniforms_yaml(config).unwrap()).unwrap();
    assert_eq!(uniforms.len(), 3);
    assert!((uniforms[0] - 10.0 / 11.0).abs() < 1e-12);
    assert!((uniforms[1] - 4.0 / 11.0).abs() < 1e-12);
    assert!((uniforms[2] - 6.0 / 11.0).abs() < 1e-12);
}

#[test]
#[wasm_bindgen_test]
fn exponential_variable_from_json() {
    let mut session = session();
    let spec = r#"
{
    "distribution": {
        "exponential": {
            "lambda": 2.0
        }
    },
    "indices": {
        "single": "1-4"
    }
}"#;
    let variable: serde_json::Value =
        serde_json::from_str(&session.generate_variable_json("arrivals", spec).unwrap()).unwrap();
    assert_eq!(variable["name"], "arrivals");
    assert_eq!(variable["values"].as_array().unwrap().len(), 4);
    assert_eq!(variable["metadata"]["indexText"], "U=1-4");
    assert_eq!(variable["metadata"]["parameters"], "λ=2");
    let steps: serde_json::Value =
        serde_json::from_str(&session.calculation_trace_json("arrivals").unwrap()).unwrap();
    assert_eq!(steps.as_array().unwrap().len(), 4);
    assert_eq!(steps[0]["exponential"]["u"], 0.375);
}

#[test]
#[wasm_bindgen_test]
fn queue_and_inventory_tables_as_json() {
    let mut session = session();
    let arrivals = r#"
distribution:
  exponential:
    lambda: 2.0
indices:
  single: "1-4"
"#;
    let services = r#"
distribution:
  exponential:
    lambda: 1.0
indices:
  single: "5-8"
"#;
    let demand = r#"
distribution:
  poisson:
    lambda: 10.0
indices:
  single: "1-8"
"#;
    session.generate_variable_yaml("arrivals", arrivals).unwrap();
    session.generate_variable_yaml("services", services).unwrap();
    session.generate_variable_yaml("demand", demand).unwrap();
    let variables: serde_json::Value =
        serde_json::from_str(&session.get_variables_json().unwrap()).unwrap();
    assert_eq!(variables.as_array().unwrap().len(), 3);

    let queue: serde_json::Value =
        serde_json::from_str(&session.simulate_queue_json("arrivals", "services").unwrap())
            .unwrap();
    let queue = queue.as_array().unwrap();
    assert_eq!(queue.len(), 4);
    assert_eq!(queue[0]["customer"], 1);
    assert_eq!(queue[0]["wait"], 0.0);

    let policy = r#"
{
    "openingInventory": 15.0,
    "orderQuantity": 20.0,
    "reorderPeriod": 2,
    "capacity": 40.0,
    "orderCost": 50.0,
    "holdingCost": 1.0,
    "shortageCost": 5.0
}"#;
    let inventory: serde_json::Value =
        serde_json::from_str(&session.simulate_inventory_json("demand", policy).unwrap()).unwrap();
    let inventory = inventory.as_array().unwrap();
    assert_eq!(inventory.len(), 8);
    assert_eq!(inventory[0]["opening"], 15.0);
    assert_eq!(inventory[0]["received"], 0.0);
}

#[test]
#[wasm_bindgen_test]
fn session_state_serializes() {
    let session = session();
    let state: serde_json::Value = serde_json::from_str(&session.get_json().unwrap()).unwrap();
    assert_eq!(state["uniforms"].as_array().unwrap().len(), 8);
    assert_eq!(state["generator"]["seed"], 7);
}
