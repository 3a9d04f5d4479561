//! In-memory requestor and bridge doubles for orchestrator and route tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::capabilities::Capability;
use crate::dispatch::{validate_invocation, DispatchBridge};
use crate::error::BridgeError;
use crate::llms::{CompletionOutcome, CompletionRequestor};
use crate::tools::{CapabilityInvocation, InvocationResult};

/// Returns a fixed outcome and records what it was asked.
pub(crate) struct ScriptedRequestor {
    outcome: Result<CompletionOutcome, BridgeError>,
    messages: Mutex<Vec<String>>,
    capability_counts: Mutex<Vec<usize>>,
}

impl ScriptedRequestor {
    pub(crate) fn new(outcome: Result<CompletionOutcome, BridgeError>) -> Self {
        Self {
            outcome,
            messages: Mutex::new(Vec::new()),
            capability_counts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub(crate) fn capability_counts(&self) -> Vec<usize> {
        self.capability_counts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionRequestor for ScriptedRequestor {
    fn provider(&self) -> &str {
        "scripted"
    }

    async fn decide(
        &self,
        user_message: &str,
        capabilities: &[Capability],
    ) -> Result<CompletionOutcome, BridgeError> {
        self.messages.lock().unwrap().push(user_message.to_string());
        self.capability_counts
            .lock()
            .unwrap()
            .push(capabilities.len());
        self.outcome.clone()
    }
}

/// Returns a fixed result and records every invocation it receives.
pub(crate) struct RecordingBridge {
    result: Result<Value, BridgeError>,
    calls: Mutex<Vec<CapabilityInvocation>>,
}

impl RecordingBridge {
    pub(crate) fn returning(result: Value) -> Self {
        Self {
            result: Ok(result),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(error: BridgeError) -> Self {
        Self {
            result: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<CapabilityInvocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DispatchBridge for RecordingBridge {
    async fn invoke(
        &self,
        invocation: &CapabilityInvocation,
    ) -> Result<InvocationResult, BridgeError> {
        validate_invocation(invocation)?;
        self.calls.lock().unwrap().push(invocation.clone());
        self.result
            .clone()
            .map(|result| InvocationResult { result })
    }
}
