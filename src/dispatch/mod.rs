//! # Dispatch Bridge
//!
//! Turns a model's capability selection into a call against the execution
//! backend and relays the backend's result unchanged.
//!
//! ## Dispatch flow
//!
//! 1. Reject an invocation with a blank capability name (`InvalidInvocation`),
//!    before any network traffic.
//! 2. Serialize `{function, args}`; argument values pass through structurally.
//! 3. `POST` the envelope to the backend's call endpoint.
//! 4. Transport failure or non-2xx status → `BackendUnavailable`. Never
//!    retried, since the backend's side effects may not be idempotent.
//! 5. Body that is not a result envelope → `MalformedBackendResponse`.
//! 6. Return the `result` verbatim.

pub mod envelope;
pub mod http;

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::tools::{CapabilityInvocation, InvocationResult};

pub use envelope::{CallRequest, CALL_FUNCTION_PATH};
pub use http::HttpDispatchBridge;

/// Forwards capability invocations to an execution backend.
///
/// Implementations keep no state between calls and are safe to share across
/// concurrent requests.
#[async_trait]
pub trait DispatchBridge: Send + Sync {
    async fn invoke(
        &self,
        invocation: &CapabilityInvocation,
    ) -> Result<InvocationResult, BridgeError>;
}

/// Step 1 of the dispatch flow, shared by all bridge implementations.
pub fn validate_invocation(invocation: &CapabilityInvocation) -> Result<(), BridgeError> {
    if invocation.capability.trim().is_empty() {
        return Err(BridgeError::InvalidInvocation(
            "model selected a capability with no name".to_string(),
        ));
    }
    Ok(())
}
