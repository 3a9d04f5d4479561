//! Completion Requestor contract.
//!
//! A requestor makes exactly one call to a language-model service and
//! reports whether the model answered in text or selected a capability.

use async_trait::async_trait;

use crate::capabilities::Capability;
use crate::error::BridgeError;
use crate::tools::CapabilityInvocation;

/// What the model decided for one user message.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    /// The model answered without selecting a capability.
    TextOnly { content: String },
    /// The model selected exactly one capability.
    CapabilitySelected {
        content: Option<String>,
        invocation: CapabilityInvocation,
    },
}

/// Asks a language model to decide whether a capability should be invoked.
///
/// Implementations must present every capability's name, description and
/// schema verbatim, issue exactly one outbound call per `decide`, honor only
/// the first of several candidate invocations, and never retry.
#[async_trait]
pub trait CompletionRequestor: Send + Sync {
    /// Provider name, for logging.
    fn provider(&self) -> &str;

    async fn decide(
        &self,
        user_message: &str,
        capabilities: &[Capability],
    ) -> Result<CompletionOutcome, BridgeError>;
}
