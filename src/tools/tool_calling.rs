//! Tool calling data structures.
//!
//! A [`CapabilityInvocation`] is what the completion requestor produces when
//! the model decides to call a capability, and what the dispatch bridge
//! consumes. Arguments stay untyped (`serde_json::Value`) at this layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Untyped argument bag flowing from the model to the execution backend.
pub type ArgumentMap = Map<String, Value>;

/// A concrete request to perform one capability with specific arguments.
///
/// Arguments are not guaranteed to satisfy the capability's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityInvocation {
    /// The name of the capability to call.
    pub capability: String,
    /// Arguments exactly as the model produced them.
    #[serde(default)]
    pub arguments: ArgumentMap,
}

impl CapabilityInvocation {
    pub fn new(capability: impl Into<String>, arguments: ArgumentMap) -> Self {
        Self {
            capability: capability.into(),
            arguments,
        }
    }

    /// Decode the JSON-encoded argument string of a model tool call.
    ///
    /// A blank string decodes to an empty map; anything else must be a JSON
    /// object.
    pub fn parse_arguments(raw: &str) -> Result<ArgumentMap, String> {
        if raw.trim().is_empty() {
            return Ok(ArgumentMap::new());
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(format!(
                "tool arguments must be a JSON object, got {}",
                json_type_name(&other)
            )),
            Err(e) => Err(format!("error parsing tool arguments: {}", e)),
        }
    }
}

/// Opaque payload returned by the execution backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub result: Value,
}

/// An invocation together with its result, as relayed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRecord {
    #[serde(rename = "function")]
    pub capability: String,
    #[serde(rename = "args")]
    pub arguments: ArgumentMap,
    pub result: Value,
}

impl InvocationRecord {
    pub fn new(invocation: CapabilityInvocation, result: InvocationResult) -> Self {
        Self {
            capability: invocation.capability,
            arguments: invocation.arguments,
            result: result.result,
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
