//! # Capability Registry
//!
//! The static catalog of capabilities the language model may select. Each
//! capability has a name, a description and an optional argument schema;
//! the catalog is handed to the completion requestor verbatim and is never
//! consulted by the dispatch bridge.

pub mod capability;
pub mod registry;

pub use capability::{ArgumentSchema, ArgumentSpec, ArgumentType, Capability};
pub use registry::{CapabilityRegistry, RegistryError};
