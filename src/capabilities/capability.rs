//! Capability definition — a named, schema-described operation the model
//! may choose to invoke.
//!
//! Capabilities are immutable once the registry is built. Their argument
//! schemas are presented to the language model verbatim and are advisory:
//! nothing in the bridge enforces them against the model's arguments.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::registry::RegistryError;

/// A capability the language model may select.
///
/// Example YAML:
/// ```yaml
/// name: "create_absence_request"
/// description: "Create absence request"
/// schema:
///   properties:
///     user_email: { type: "string", description: "The email address of the user" }
///     in_active_hours: { type: "number", description: "Hours of inactivity" }
///   required: ["user_email"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    /// Function name presented to the model and forwarded to the backend.
    pub name: String,

    /// Human-readable description of what the capability does.
    pub description: String,

    /// Accepted arguments; `None` for capabilities without parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<ArgumentSchema>,
}

impl Capability {
    /// Create a capability without an argument schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema: None,
        }
    }

    /// Attach an argument schema.
    pub fn with_schema(mut self, schema: ArgumentSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// JSON Schema rendering of the arguments, if any.
    pub fn parameters(&self) -> Option<Value> {
        self.schema.as_ref().map(ArgumentSchema::to_json_schema)
    }

    pub(crate) fn validate(&self) -> Result<(), RegistryError> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::Validation(
                "capability name must not be empty".to_string(),
            ));
        }
        if let Some(schema) = &self.schema {
            schema.validate(&self.name)?;
        }
        Ok(())
    }
}

/// Primitive argument types understood by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentType {
    String,
    Number,
    Boolean,
    Object,
}

impl ArgumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }
}

/// One argument accepted by a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    #[serde(rename = "type")]
    pub kind: ArgumentType,

    #[serde(default)]
    pub description: String,

    /// Nested schema for `object` arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<ArgumentSchema>,
}

impl ArgumentSpec {
    pub fn new(kind: ArgumentType, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            schema: None,
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::new(ArgumentType::String, description)
    }

    pub fn number(description: impl Into<String>) -> Self {
        Self::new(ArgumentType::Number, description)
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        Self::new(ArgumentType::Boolean, description)
    }

    /// An `object` argument with its own nested schema.
    pub fn object(description: impl Into<String>, schema: ArgumentSchema) -> Self {
        Self {
            kind: ArgumentType::Object,
            description: description.into(),
            schema: Some(schema),
        }
    }

    fn to_json_schema(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".to_string(), json!(self.kind.as_str()));
        out.insert("description".to_string(), json!(self.description));
        if let Some(nested) = &self.schema {
            if let Value::Object(fields) = nested.to_json_schema() {
                for (key, value) in fields {
                    if key != "type" {
                        out.insert(key, value);
                    }
                }
            }
        }
        Value::Object(out)
    }
}

/// Declarative description of a capability's arguments.
///
/// Invariant: every name in `required` is a key of `properties`, at every
/// nesting level. Checked when the registry is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSchema {
    #[serde(default)]
    pub properties: BTreeMap<String, ArgumentSpec>,

    #[serde(default)]
    pub required: BTreeSet<String>,
}

impl ArgumentSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an optional argument.
    pub fn optional(mut self, name: impl Into<String>, spec: ArgumentSpec) -> Self {
        self.properties.insert(name.into(), spec);
        self
    }

    /// Add a required argument.
    pub fn required(mut self, name: impl Into<String>, spec: ArgumentSpec) -> Self {
        let name = name.into();
        self.required.insert(name.clone());
        self.properties.insert(name, spec);
        self
    }

    /// Render as a JSON Schema object, the shape function-calling models
    /// expect in `parameters`.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, spec)| (name.clone(), spec.to_json_schema()))
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": self.required.iter().collect::<Vec<_>>(),
        })
    }

    fn validate(&self, path: &str) -> Result<(), RegistryError> {
        if let Some(missing) = self
            .required
            .iter()
            .find(|name| !self.properties.contains_key(*name))
        {
            return Err(RegistryError::Validation(format!(
                "'{}' requires undeclared argument '{}'",
                path, missing
            )));
        }
        for (name, spec) in &self.properties {
            if let Some(nested) = &spec.schema {
                if spec.kind != ArgumentType::Object {
                    return Err(RegistryError::Validation(format!(
                        "'{}.{}' has a nested schema but type '{}'",
                        path,
                        name,
                        spec.kind.as_str()
                    )));
                }
                nested.validate(&format!("{}.{}", path, name))?;
            }
        }
        Ok(())
    }
}
