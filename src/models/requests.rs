//! Request DTOs for the memoization API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// Request body for lookups (POST /get, POST /metadata)
///
/// # Fields
/// - `prompt`: Prompt text of the upstream request
/// - `model`: Model tag the request was routed to
/// - `options`: Optional request options that affect the response
#[derive(Debug, Clone, Deserialize)]
pub struct LookupRequest {
    pub prompt: String,
    pub model: String,
    #[serde(default)]
    pub options: Option<Value>,
}

impl LookupRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_model(&self.model)
    }
}

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `prompt`, `model`, `options`: Identify the request, as for lookups
/// - `value`: The response payload to memoize
/// - `ttl_ms`: Optional lifetime in milliseconds (uses default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub prompt: String,
    pub model: String,
    pub value: Value,
    #[serde(default)]
    pub options: Option<Value>,
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl SetRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_model(&self.model)
    }
}

fn validate_model(model: &str) -> Option<String> {
    if model.trim().is_empty() {
        return Some("Model cannot be empty".to_string());
    }
    None
}
