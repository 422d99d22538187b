use jsonschema::JSONSchema;
use serde_json::Value;
use tracing::{error, info};

use crate::http::ApiResponse;

/// Validate a response body against a JSON schema.
///
/// Mismatches, undecodable bodies and invalid schemas are logged and reported
/// as `false`.
pub fn validate_schema(response: &ApiResponse, schema: &Value) -> bool {
    match response.json_value() {
        Ok(body) => validate_value(&body, schema),
        Err(e) => {
            error!("Invalid JSON response: {}", e);
            false
        }
    }
}

pub fn validate_value(instance: &Value, schema: &Value) -> bool {
    let compiled = match JSONSchema::compile(schema) {
        Ok(compiled) => compiled,
        Err(e) => {
            error!("Invalid JSON schema: {}", e);
            return false;
        }
    };

    if let Err(errors) = compiled.validate(instance) {
        for e in errors {
            error!(path = %e.instance_path, "Schema validation failed: {}", e);
        }
        return false;
    }

    info!("Schema validation passed");
    true
}
