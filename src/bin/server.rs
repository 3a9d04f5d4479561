//! mcp-bridge HTTP server binary.
//!
//! Starts an axum HTTP server that asks the language model to pick a
//! capability for each request and dispatches it to the execution backend.
//!
//! # Environment Variables
//!
//! - `PORT` — HTTP port (default: 8080)
//! - `OPENAI_API_KEY` — API key for the language model
//! - `OPENAI_MODEL` — Chat model (default: "gpt-4")
//! - `MCP_SERVER_URL` — Execution backend base URL (default: "http://localhost:8080")
//! - `CAPABILITIES_FILE` — Optional YAML capability catalog
//! - `RUST_LOG` — Tracing filter (default: "info,mcp_bridge=debug")
//!
//! See `BridgeConfig` for the full list.
//!
//! # Usage
//!
//! ```bash
//! OPENAI_API_KEY=sk-... MCP_SERVER_URL=http://localhost:3000 cargo run --bin server
//! ```

use std::sync::Arc;

use anyhow::Context;
use mcp_bridge::server::{app_router, AppState};
use mcp_bridge::{
    BridgeConfig, CapabilityRegistry, HttpDispatchBridge, OpenAICompletion, RequestOrchestrator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mcp_bridge=debug".into()),
        )
        .init();

    let config = BridgeConfig::from_env().context("Invalid configuration")?;
    tracing::debug!("Configuration: {:?}", config);

    let registry = match &config.capabilities_file {
        Some(path) => CapabilityRegistry::from_file(path)
            .with_context(|| format!("Failed to load capabilities from {}", path.display()))?,
        None => CapabilityRegistry::builtin(),
    };
    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; /process requests will fail");
    }

    let requestor =
        OpenAICompletion::from_config(&config).context("Failed to build OpenAI client")?;
    let bridge =
        HttpDispatchBridge::from_config(&config).context("Failed to build backend client")?;

    let orchestrator = RequestOrchestrator::new(
        Arc::new(registry),
        Arc::new(requestor),
        Arc::new(bridge),
    );
    let capability_count = orchestrator.registry().len();
    let app = app_router(AppState::new(orchestrator));

    let bind_addr = config.bind_addr();
    tracing::info!(
        "mcp-bridge {} starting on {} ({} capabilities, model {})",
        mcp_bridge::VERSION,
        bind_addr,
        capability_count,
        config.openai_model
    );
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health       — liveness probe");
    tracing::info!("  GET  /capabilities — capability catalog");
    tracing::info!("  POST /process      — decide and dispatch");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    tracing::info!("mcp-bridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
