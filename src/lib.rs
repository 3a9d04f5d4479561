//! # mcp-bridge
//!
//! Bridges a chat-completion language model and a remote function execution
//! backend. For each request the model is asked whether one of the
//! registered capabilities should be invoked; if it selects one, the
//! invocation is forwarded to the execution backend and its result relayed
//! back to the caller unchanged.
//!
//! Data flow: inbound request → [`llms::CompletionRequestor`] → (optional)
//! [`dispatch::DispatchBridge`] → [`orchestrator::RequestOrchestrator`] →
//! outbound [`orchestrator::BridgeResponse`].

pub mod capabilities;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod llms;
pub mod orchestrator;
pub mod server;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

pub use capabilities::{Capability, CapabilityRegistry};
pub use config::BridgeConfig;
pub use dispatch::{DispatchBridge, HttpDispatchBridge};
pub use error::BridgeError;
pub use llms::{CompletionOutcome, CompletionRequestor, OpenAICompletion};
pub use orchestrator::{BridgeResponse, RequestOrchestrator};
pub use tools::{CapabilityInvocation, InvocationResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
