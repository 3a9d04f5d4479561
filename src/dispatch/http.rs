//! HTTP execution backend bridge.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::envelope::{parse_call_response, CallRequest, CALL_FUNCTION_PATH};
use super::{validate_invocation, DispatchBridge};
use crate::config::BridgeConfig;
use crate::error::{describe_transport_error, BridgeError};
use crate::tools::{CapabilityInvocation, InvocationResult};

/// Calls the execution backend's `/call-function` endpoint over HTTP.
///
/// The `reqwest::Client` pools connections and is reused for every call.
#[derive(Debug, Clone)]
pub struct HttpDispatchBridge {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDispatchBridge {
    /// Create a bridge for the backend at `base_url` with a default client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Create a bridge from the bridge configuration.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.mcp_timeout_secs))
            .build()?;
        Ok(Self::with_client(config.mcp_server_url.clone(), client))
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, CALL_FUNCTION_PATH)
    }
}

#[async_trait]
impl DispatchBridge for HttpDispatchBridge {
    async fn invoke(
        &self,
        invocation: &CapabilityInvocation,
    ) -> Result<InvocationResult, BridgeError> {
        validate_invocation(invocation)?;

        let envelope = CallRequest {
            function: &invocation.capability,
            args: &invocation.arguments,
        };

        log::info!(
            "Dispatching capability '{}' ({} arguments)",
            invocation.capability,
            invocation.arguments.len()
        );
        let started_at = Instant::now();

        let response = self
            .client
            .post(self.endpoint())
            .json(&envelope)
            .send()
            .await
            .map_err(|e| {
                let detail = describe_transport_error(e);
                log::error!(
                    "Capability '{}' dispatch failed: {}",
                    invocation.capability,
                    detail
                );
                BridgeError::backend_unavailable(detail)
            })?;

        let status = response.status();
        if !status.is_success() {
            log::error!(
                "Capability '{}' dispatch failed with HTTP {} ({}ms)",
                invocation.capability,
                status,
                started_at.elapsed().as_millis()
            );
            return Err(BridgeError::backend_unavailable(format!(
                "execution backend returned HTTP {}",
                status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BridgeError::backend_unavailable(describe_transport_error(e)))?;

        let result = parse_call_response(&body).map_err(|detail| {
            log::error!(
                "Capability '{}' returned a malformed envelope: {}",
                invocation.capability,
                detail
            );
            BridgeError::malformed_backend_response(detail)
        })?;

        log::info!(
            "Capability '{}' completed ({}ms)",
            invocation.capability,
            started_at.elapsed().as_millis()
        );

        Ok(InvocationResult { result })
    }
}
