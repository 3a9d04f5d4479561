//! HTTP server for the bridge.
//!
//! # Endpoints
//!
//! - `GET  /`             — Service banner
//! - `GET  /health`       — Liveness probe
//! - `GET  /capabilities` — Capability catalog
//! - `POST /process`      — Decide and dispatch for one user message

pub mod routes;

pub use routes::{app_router, AppState, ProcessRequest};
