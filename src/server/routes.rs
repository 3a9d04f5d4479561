//! Axum route handlers for the bridge HTTP server.
//!
//! # Routes
//!
//! - `GET  /`             — Returns `{"message": "AI Server is running", "status": "healthy"}`
//! - `GET  /health`       — Returns `{"status": "healthy"}`
//! - `GET  /capabilities` — Lists the capability catalog
//! - `POST /process`      — Accepts `{"message": "..."}`, returns a `BridgeResponse`

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::BridgeError;
use crate::orchestrator::{BridgeResponse, RequestOrchestrator};

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RequestOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: RequestOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Body of `POST /process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub message: String,
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/capabilities", get(capabilities_handler))
        .route("/process", post(process_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP status reported for each error class.
pub fn status_for(error: &BridgeError) -> StatusCode {
    match error {
        BridgeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        BridgeError::InvalidInvocation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BridgeError::Upstream { .. } | BridgeError::BackendUnavailable { .. } => {
            StatusCode::BAD_GATEWAY
        }
        BridgeError::MalformedBackendResponse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));
        (status_for(&self), body).into_response()
    }
}

/// GET / — service banner.
async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "message": "AI Server is running",
        "status": "healthy",
    }))
}

/// GET /health — liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

/// GET /capabilities — the catalog presented to the model.
async fn capabilities_handler(State(state): State<AppState>) -> Json<Value> {
    let capabilities: Vec<Value> = state
        .orchestrator
        .registry()
        .list()
        .iter()
        .map(|cap| {
            json!({
                "name": cap.name,
                "description": cap.description,
                "schema": cap.parameters(),
            })
        })
        .collect();
    Json(json!({ "capabilities": capabilities }))
}

/// POST /process — decide and, if a capability was selected, dispatch it.
///
/// Request:  `{ "message": "<user message>" }`
/// Response: `{ "message": ..., "tool_call": { "function", "args", "result" } }`
///
/// Bodies that are not JSON or lack a string `message` are `InvalidRequest`.
async fn process_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<BridgeResponse>, BridgeError> {
    let Json(request) =
        payload.map_err(|rejection| BridgeError::InvalidRequest(rejection.body_text()))?;
    let response = state.orchestrator.handle(&request.message).await?;
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
