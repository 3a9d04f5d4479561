//! OpenAI Chat Completions provider.
//!
//! Sends the user message together with the capability catalog as function
//! tools (`tool_choice: "auto"`) and maps the first choice of the response
//! onto a [`CompletionOutcome`].
//!
//! There is no retry loop: a failed call surfaces immediately as
//! [`BridgeError::Upstream`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::capabilities::Capability;
use crate::config::BridgeConfig;
use crate::error::{describe_transport_error, BridgeError};
use crate::llms::requestor::{CompletionOutcome, CompletionRequestor};
use crate::tools::{ArgumentMap, CapabilityInvocation};

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Longest slice of an unparsable body quoted in an error.
const MAX_BODY_EXCERPT: usize = 200;

/// OpenAI completion requestor.
///
/// Holds one pooled `reqwest::Client`, reused across requests.
#[derive(Clone)]
pub struct OpenAICompletion {
    model: String,
    api_key: Option<String>,
    base_url: String,
    organization: Option<String>,
    temperature: Option<f64>,
    client: reqwest::Client,
}

impl fmt::Debug for OpenAICompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAICompletion")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenAICompletion {
    /// Create a provider with default base URL and temperature.
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            model: model.into(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: None,
            temperature: Some(DEFAULT_TEMPERATURE),
            client: reqwest::Client::new(),
        }
    }

    /// Create a provider from the bridge configuration.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.openai_timeout_secs))
            .build()?;

        let mut provider = Self::new(config.openai_model.clone(), config.openai_api_key.clone())
            .with_base_url(config.openai_base_url.clone())
            .with_temperature(Some(config.openai_temperature))
            .with_client(client);
        if let Some(organization) = &config.openai_organization {
            provider = provider.with_organization(organization.clone());
        }
        Ok(provider)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Render capabilities as OpenAI function tools.
    pub fn tool_definitions(capabilities: &[Capability]) -> Vec<Value> {
        capabilities
            .iter()
            .map(|cap| {
                let mut function = json!({
                    "name": cap.name,
                    "description": cap.description,
                });
                if let Some(parameters) = cap.parameters() {
                    function["parameters"] = parameters;
                }
                json!({
                    "type": "function",
                    "function": function,
                })
            })
            .collect()
    }

    /// Build the request body for the Chat Completions API.
    pub fn build_request_body(&self, user_message: &str, capabilities: &[Capability]) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": user_message},
            ],
        });

        if let Some(temp) = self.temperature {
            body["temperature"] = json!(temp);
        }
        if !capabilities.is_empty() {
            body["tools"] = Value::Array(Self::tool_definitions(capabilities));
            body["tool_choice"] = json!("auto");
        }

        body
    }

    /// Map a Chat Completions response onto a completion outcome.
    ///
    /// Only the first choice is read, and only its first tool call is
    /// honored.
    pub fn parse_completions_response(response: &Value) -> Result<CompletionOutcome, BridgeError> {
        let message = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|choice| choice.get("message"))
            .ok_or_else(|| BridgeError::upstream("no choices in OpenAI response"))?;

        let content = message
            .get("content")
            .and_then(|c| c.as_str())
            .map(String::from);

        if let Some(usage) = response.get("usage") {
            log::debug!(
                "OpenAI token usage: prompt={}, completion={}, total={}",
                usage.get("prompt_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
                usage.get("completion_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
                usage.get("total_tokens").and_then(|v| v.as_i64()).unwrap_or(0),
            );
        }

        let tool_calls = message
            .get("tool_calls")
            .and_then(|t| t.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let Some(first) = tool_calls.first() else {
            return Ok(CompletionOutcome::TextOnly {
                content: content.unwrap_or_default(),
            });
        };

        if tool_calls.len() > 1 {
            log::warn!(
                "OpenAI returned {} tool calls; only the first is dispatched",
                tool_calls.len()
            );
        }

        let function = first
            .get("function")
            .ok_or_else(|| BridgeError::upstream("tool call without a function"))?;
        let name = function
            .get("name")
            .and_then(|n| n.as_str())
            .unwrap_or_default()
            .to_string();
        let arguments = match function.get("arguments") {
            None | Some(Value::Null) => ArgumentMap::new(),
            Some(Value::String(raw)) => {
                CapabilityInvocation::parse_arguments(raw).map_err(BridgeError::upstream)?
            }
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(BridgeError::upstream(
                    "tool call arguments are neither a string nor an object",
                ))
            }
        };

        Ok(CompletionOutcome::CapabilitySelected {
            content,
            invocation: CapabilityInvocation::new(name, arguments),
        })
    }
}

/// Pull a human-readable reason out of an OpenAI error body.
fn error_reason(status: reqwest::StatusCode, body: &str) -> String {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        // Auth errors may quote part of the key.
        return "authentication rejected".to_string();
    }
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| excerpt(body))
}

fn excerpt(body: &str) -> String {
    body.chars().take(MAX_BODY_EXCERPT).collect()
}

#[async_trait]
impl CompletionRequestor for OpenAICompletion {
    fn provider(&self) -> &str {
        "openai"
    }

    async fn decide(
        &self,
        user_message: &str,
        capabilities: &[Capability],
    ) -> Result<CompletionOutcome, BridgeError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            BridgeError::upstream("OpenAI API key not set; configure OPENAI_API_KEY")
        })?;

        log::debug!(
            "OpenAICompletion.decide: model={}, capabilities={}",
            self.model,
            capabilities.len(),
        );

        let body = self.build_request_body(user_message, capabilities);

        let mut request = self.client.post(self.endpoint()).bearer_auth(api_key);
        if let Some(ref org) = self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| BridgeError::upstream(describe_transport_error(e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| BridgeError::upstream(describe_transport_error(e)))?;

        if !status.is_success() {
            return Err(BridgeError::upstream(format!(
                "OpenAI API error ({}): {}",
                status,
                error_reason(status, &response_text)
            )));
        }

        let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
            BridgeError::upstream(format!(
                "failed to parse OpenAI response: {} - body: {}",
                e,
                excerpt(&response_text)
            ))
        })?;

        Self::parse_completions_response(&response_json)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::capabilities::CapabilityRegistry;

    fn provider_for(server: &MockServer) -> OpenAICompletion {
        OpenAICompletion::new(DEFAULT_MODEL, Some("sk-test".to_string())).with_base_url(server.uri())
    }

    fn tool_call_response(calls: Value) -> Value {
        json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": null, "tool_calls": calls},
                "finish_reason": "tool_calls",
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15},
        })
    }

    #[test]
    fn test_request_body_presents_capabilities_verbatim() {
        let registry = CapabilityRegistry::builtin();
        let provider = OpenAICompletion::new("gpt-4", None);
        let body = provider.build_request_body("hello", registry.list());

        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["tool_choice"], "auto");

        let tools = body["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["type"], "function");
        assert_eq!(tools[0]["function"]["name"], "get_users");
        assert_eq!(
            tools[0]["function"]["description"],
            "Get users from the database"
        );
        assert!(tools[0]["function"].get("parameters").is_none());

        let absence = registry.get("create_absence_request").unwrap();
        assert_eq!(tools[1]["function"]["parameters"], absence.parameters().unwrap());
    }

    #[test]
    fn test_request_body_without_capabilities_omits_tools() {
        let provider = OpenAICompletion::new("gpt-4", None).with_temperature(None);
        let body = provider.build_request_body("hello", &[]);
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_parse_text_only() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello!"}}],
        });
        let outcome = OpenAICompletion::parse_completions_response(&response).unwrap();
        assert_eq!(
            outcome,
            CompletionOutcome::TextOnly {
                content: "Hello!".to_string()
            }
        );
    }

    #[test]
    fn test_parse_honors_only_first_tool_call() {
        let response = tool_call_response(json!([
            {"id": "c1", "type": "function", "function": {
                "name": "create_absence_request",
                "arguments": "{\"user_email\":\"a@b.com\",\"in_active_hours\":16}"
            }},
            {"id": "c2", "type": "function", "function": {"name": "get_users", "arguments": "{}"}},
        ]));
        let outcome = OpenAICompletion::parse_completions_response(&response).unwrap();
        match outcome {
            CompletionOutcome::CapabilitySelected {
                content,
                invocation,
            } => {
                assert!(content.is_none());
                assert_eq!(invocation.capability, "create_absence_request");
                assert_eq!(invocation.arguments["user_email"], "a@b.com");
                assert_eq!(invocation.arguments["in_active_hours"], 16);
            }
            other => panic!("expected a capability selection, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_tool_call_without_name_keeps_empty_name() {
        let response = tool_call_response(json!([
            {"id": "c1", "type": "function", "function": {"arguments": "{}"}},
        ]));
        let outcome = OpenAICompletion::parse_completions_response(&response).unwrap();
        match outcome {
            CompletionOutcome::CapabilitySelected { invocation, .. } => {
                assert_eq!(invocation.capability, "");
                assert!(invocation.arguments.is_empty());
            }
            other => panic!("expected a capability selection, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_bad_arguments_is_upstream_error() {
        let response = tool_call_response(json!([
            {"id": "c1", "type": "function", "function": {"name": "get_users", "arguments": "{oops"}},
        ]));
        let err = OpenAICompletion::parse_completions_response(&response).unwrap_err();
        assert_eq!(err.kind(), "upstream_error");
    }

    #[test]
    fn test_parse_no_choices_is_upstream_error() {
        let err = OpenAICompletion::parse_completions_response(&json!({"choices": []})).unwrap_err();
        assert_eq!(err, BridgeError::upstream("no choices in OpenAI response"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let provider = OpenAICompletion::new("gpt-4", Some("sk-secret".to_string()));
        let rendered = format!("{:?}", provider);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_decide_sends_one_request_and_parses_tool_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "messages": [{"role": "user", "content": "create an absence"}],
                "tool_choice": "auto",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_call_response(json!([
                {"id": "c1", "type": "function", "function": {"name": "get_users", "arguments": ""}},
            ]))))
            .expect(1)
            .mount(&server)
            .await;

        let registry = CapabilityRegistry::builtin();
        let outcome = provider_for(&server)
            .decide("create an absence", registry.list())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CompletionOutcome::CapabilitySelected {
                content: None,
                invocation: CapabilityInvocation::new("get_users", ArgumentMap::new()),
            }
        );
    }

    #[tokio::test]
    async fn test_from_config_sends_model_and_organization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-live"))
            .and(header("OpenAI-Organization", "org-1"))
            .and(body_partial_json(json!({"model": "gpt-4o"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Hello!"}}],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = BridgeConfig {
            openai_api_key: Some("sk-live".to_string()),
            openai_base_url: server.uri(),
            openai_model: "gpt-4o".to_string(),
            openai_organization: Some("org-1".to_string()),
            ..BridgeConfig::default()
        };
        let provider = OpenAICompletion::from_config(&config).unwrap();
        let outcome = provider.decide("hi", &[]).await.unwrap();
        assert_eq!(
            outcome,
            CompletionOutcome::TextOnly {
                content: "Hello!".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_decide_error_status_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "Rate limit reached", "type": "requests"},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider_for(&server).decide("hi", &[]).await.unwrap_err();
        assert_eq!(err.kind(), "upstream_error");
        assert!(err.to_string().contains("Rate limit reached"));
    }

    #[tokio::test]
    async fn test_decide_auth_error_hides_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided: sk-test"},
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server).decide("hi", &[]).await.unwrap_err();
        assert!(!err.to_string().contains("sk-test"));
        assert!(err.to_string().contains("authentication rejected"));
    }

    #[tokio::test]
    async fn test_decide_unparsable_body_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = provider_for(&server).decide("hi", &[]).await.unwrap_err();
        assert!(err.to_string().contains("failed to parse OpenAI response"));
    }

    #[tokio::test]
    async fn test_decide_without_api_key_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = OpenAICompletion::new("gpt-4", None).with_base_url(server.uri());
        let err = provider.decide("hi", &[]).await.unwrap_err();
        assert_eq!(err.kind(), "upstream_error");
    }

    #[tokio::test]
    async fn test_decide_unreachable_is_upstream_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = OpenAICompletion::new("gpt-4", Some("sk-test".to_string()))
            .with_base_url(format!("http://{}", addr));
        let err = provider.decide("hi", &[]).await.unwrap_err();
        assert_eq!(err.kind(), "upstream_error");
        assert!(!err.to_string().contains(&addr.to_string()));
    }
}
