//! Bridge errors.
//!
//! Every failure of the completion requestor or the dispatch bridge aborts
//! the current request and surfaces as a [`BridgeError`]. Details name the
//! external call that failed and why, but never carry API keys or service
//! URLs.

use thiserror::Error;

/// Errors that can occur while handling a single bridge request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The inbound request was rejected before any external call.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The model selected a capability without a usable name.
    #[error("Invalid invocation: {0}")]
    InvalidInvocation(String),

    /// The language-model service was unreachable or answered with
    /// something that could not be interpreted.
    #[error("Language model service error: {detail}")]
    Upstream { detail: String },

    /// The execution backend was unreachable or returned an error status.
    #[error("Execution backend unavailable: {detail}")]
    BackendUnavailable { detail: String },

    /// The execution backend answered with a body that is not a result
    /// envelope.
    #[error("Malformed execution backend response: {detail}")]
    MalformedBackendResponse { detail: String },
}

impl BridgeError {
    pub fn upstream(detail: impl Into<String>) -> Self {
        Self::Upstream {
            detail: detail.into(),
        }
    }

    pub fn backend_unavailable(detail: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            detail: detail.into(),
        }
    }

    pub fn malformed_backend_response(detail: impl Into<String>) -> Self {
        Self::MalformedBackendResponse {
            detail: detail.into(),
        }
    }

    /// Stable machine-readable name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidInvocation(_) => "invalid_invocation",
            Self::Upstream { .. } => "upstream_error",
            Self::BackendUnavailable { .. } => "backend_unavailable",
            Self::MalformedBackendResponse { .. } => "malformed_backend_response",
        }
    }
}

/// Describe a `reqwest` transport failure without the request URL.
///
/// `reqwest::Error`'s `Display` embeds the URL, which may point at internal
/// hosts, so the URL is stripped before formatting.
pub(crate) fn describe_transport_error(err: reqwest::Error) -> String {
    let class = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_body() || err.is_decode() {
        "failed to read response body"
    } else {
        "request failed"
    };
    let err = err.without_url();
    format!("{}: {}", class, err)
}
