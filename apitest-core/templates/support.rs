//! Runtime support for the generated API tests

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::any::Any;
use std::panic;
use std::time::Instant;

pub type TestResult = Result<(), String>;

/// One generated test function
pub struct TestCase {
    pub name: String,
    pub run: fn() -> TestResult,
}

impl TestCase {
    pub fn new(module: &str, function: &str, run: fn() -> TestResult) -> Self {
        Self { name: format!("{}::{}", module, function), run }
    }
}

/// Run every test and print one line per test. The process exits successfully
/// once all tests were reported; failures are only visible in the output.
pub fn run_all(tests: Vec<TestCase>) {
    panic::set_hook(Box::new(|_| {}));

    for test in tests {
        let started = Instant::now();
        let outcome = panic::catch_unwind(test.run).unwrap_or_else(|payload| Err(panic_message(payload)));
        match outcome {
            Ok(()) => println!("{} ... passed ({:.3} seconds)", test.name, started.elapsed().as_secs_f64()),
            Err(message) => println!("{} ... error: {}", test.name, one_line(&message)),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}

fn one_line(message: &str) -> String {
    let flattened = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.is_empty() { "failed".to_string() } else { flattened }
}

/// Decode straight from the payload text
pub fn decode_fast<T: DeserializeOwned>(payload: &str) -> Result<T, String> {
    serde_json::from_str(payload).map_err(|e| format!("decoding failed: {}", e))
}

/// Parse into a JSON tree first, then decode from the tree
pub fn decode_stable<T: DeserializeOwned>(payload: &str) -> Result<T, String> {
    let tree: Value = serde_json::from_str(payload).map_err(|e| format!("invalid JSON: {}", e))?;
    serde_json::from_value(tree).map_err(|e| format!("decoding failed: {}", e))
}

/// Required member that may be `null`
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// Compare two JSON texts structurally
pub fn assert_same_json(actual: &str, expected: &str) -> TestResult {
    let actual: Value = serde_json::from_str(actual).map_err(|e| format!("invalid JSON: {}", e))?;
    let expected: Value = serde_json::from_str(expected).map_err(|e| format!("invalid example: {}", e))?;
    if actual == expected {
        Ok(())
    } else {
        Err(format!("response does not match the example: {}", actual))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToOne {
    pub data: ResourceIdentifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullableToOne {
    #[serde(deserialize_with = "nullable")]
    pub data: Option<ResourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToMany {
    pub data: Vec<ResourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}
