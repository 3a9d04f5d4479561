//! Capability Registry — the read-only catalog of invocable capabilities.
//!
//! The registry is built once at startup, either from the built-in catalog
//! or from a YAML file, and shared behind an `Arc` for the process lifetime.
//! A malformed catalog is a startup error; nothing is mutated at runtime.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::capability::{ArgumentSchema, ArgumentSpec, Capability};

/// Errors raised while building a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Two capabilities share a name.
    #[error("Duplicate capability: {0}")]
    Duplicate(String),

    /// A capability or its schema violates an invariant.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Wrapper for YAML catalogs with a top-level `capabilities:` list.
#[derive(Debug, Deserialize)]
struct CapabilityListWrapper {
    capabilities: Vec<Capability>,
}

/// Immutable catalog of capabilities, in definition order.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: Vec<Capability>,
}

impl CapabilityRegistry {
    /// Build a registry, validating every schema and rejecting duplicate
    /// names.
    pub fn new(capabilities: Vec<Capability>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for cap in &capabilities {
            cap.validate()?;
            if !seen.insert(cap.name.as_str()) {
                return Err(RegistryError::Duplicate(cap.name.clone()));
            }
        }
        Ok(Self { capabilities })
    }

    /// The built-in catalog served when no catalog file is configured.
    pub fn builtin() -> Self {
        let absence = ArgumentSchema::new()
            .required(
                "user_email",
                ArgumentSpec::string("The email address of the user requesting absence"),
            )
            .required(
                "start_date",
                ArgumentSpec::string("The start date of the absence (YYYY-MM-DD)"),
            )
            .required(
                "end_date",
                ArgumentSpec::string("The end date of the absence (YYYY-MM-DD)"),
            )
            .required("reason", ArgumentSpec::string("The reason for the absence"))
            .required(
                "in_active_hours",
                ArgumentSpec::number(
                    "The number of hours the user will be inactive. If not provided, it will be \
                     calculated based on the start and end date. 1 day = 8 hour",
                ),
            );

        Self {
            capabilities: vec![
                Capability::new("get_users", "Get users from the database"),
                Capability::new("create_absence_request", "Create absence request")
                    .with_schema(absence),
            ],
        }
    }

    /// Parse a YAML catalog with a top-level `capabilities:` list.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RegistryError> {
        let list: CapabilityListWrapper = serde_yaml::from_str(yaml)?;
        Self::new(list.capabilities)
    }

    /// Load a YAML catalog from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let registry = Self::from_yaml_str(&content)?;
        log::info!(
            "Loaded {} capabilities from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// All capabilities, in definition order.
    pub fn list(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.capabilities.iter().find(|cap| cap.name == name)
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}
