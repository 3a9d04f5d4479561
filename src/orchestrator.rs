//! Request Orchestrator — one pass from user message to response envelope.
//!
//! `AwaitingDecision → (TextOnly | CapabilitySelected) → Done`. The
//! completion call and the dispatch call run strictly in sequence; any
//! failure aborts the request with no partial envelope.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capabilities::CapabilityRegistry;
use crate::dispatch::DispatchBridge;
use crate::error::BridgeError;
use crate::llms::{CompletionOutcome, CompletionRequestor};
use crate::tools::InvocationRecord;

/// Outward-facing response envelope.
///
/// `invocation` is present only when the model selected a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub message: Option<String>,
    #[serde(
        rename = "tool_call",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub invocation: Option<InvocationRecord>,
}

/// Composes the completion requestor and the dispatch bridge.
#[derive(Clone)]
pub struct RequestOrchestrator {
    registry: Arc<CapabilityRegistry>,
    requestor: Arc<dyn CompletionRequestor>,
    bridge: Arc<dyn DispatchBridge>,
}

impl RequestOrchestrator {
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        requestor: Arc<dyn CompletionRequestor>,
        bridge: Arc<dyn DispatchBridge>,
    ) -> Self {
        Self {
            registry,
            requestor,
            bridge,
        }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Handle one user message.
    pub async fn handle(&self, user_message: &str) -> Result<BridgeResponse, BridgeError> {
        if user_message.trim().is_empty() {
            return Err(BridgeError::InvalidRequest(
                "message must not be empty".to_string(),
            ));
        }

        let request_id = Uuid::new_v4();
        log::debug!(
            "[{}] requesting decision from {} ({} capabilities)",
            request_id,
            self.requestor.provider(),
            self.registry.len()
        );

        let outcome = self
            .requestor
            .decide(user_message, self.registry.list())
            .await
            .map_err(|e| {
                log::warn!("[{}] completion failed: {}", request_id, e);
                e
            })?;

        match outcome {
            CompletionOutcome::TextOnly { content } => {
                log::debug!("[{}] model answered without a capability", request_id);
                Ok(BridgeResponse {
                    message: Some(content),
                    invocation: None,
                })
            }
            CompletionOutcome::CapabilitySelected {
                content,
                invocation,
            } => {
                log::info!(
                    "[{}] model selected capability '{}'",
                    request_id,
                    invocation.capability
                );
                let result = self.bridge.invoke(&invocation).await.map_err(|e| {
                    log::warn!("[{}] dispatch failed: {}", request_id, e);
                    e
                })?;
                Ok(BridgeResponse {
                    message: content,
                    invocation: Some(InvocationRecord::new(invocation, result)),
                })
            }
        }
    }
}
