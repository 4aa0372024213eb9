/// Validate a payload against a JSON schema
pub fn validate(payload: &str, schema: &str) -> TestResult {
    let instance: Value = serde_json::from_str(payload).map_err(|e| format!("invalid JSON: {}", e))?;
    let schema: Value = serde_json::from_str(schema).map_err(|e| format!("invalid schema: {}", e))?;
    let validator = jsonschema::validator_for(&schema).map_err(|e| format!("invalid schema: {}", e))?;

    match validator.iter_errors(&instance).next() {
        Some(error) => Err(format!("schema violation: {}", error)),
        None => Ok(()),
    }
}
