//! Execution backend call envelopes.
//!
//! The backend exposes a single `/call-function` endpoint that accepts a
//! function name plus argument map and answers with `{"result": ...}`.

use serde::Serialize;
use serde_json::Value;

use crate::tools::ArgumentMap;

/// Path of the backend's call endpoint, relative to its base URL.
pub const CALL_FUNCTION_PATH: &str = "/call-function";

/// Request body sent to the execution backend.
#[derive(Debug, Clone, Serialize)]
pub struct CallRequest<'a> {
    pub function: &'a str,
    pub args: &'a ArgumentMap,
}

/// Parse a backend response body into its `result`.
///
/// The body must be a JSON object carrying a `result` key; the value itself
/// may be anything, `null` included, and is returned untouched.
pub fn parse_call_response(body: &[u8]) -> Result<Value, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| format!("body is not valid JSON: {}", e))?;
    match value {
        Value::Object(mut envelope) => envelope
            .remove("result")
            .ok_or_else(|| "response envelope has no 'result' field".to_string()),
        _ => Err("response body is not a JSON object".to_string()),
    }
}
