// ============================================================
// Layer 1 — HTTP API
// ============================================================
// The prediction service:
//
//   POST /predict_eng  → Prediction JSON, or an ApiError envelope
//   GET  /health       → {"status", "variant", "version"}
//
// AppState is built once at startup and cloned into every
// handler. The predictor sits behind a trait object so tests can
// swap in a stub.
//
//   error.rs    — ApiError and its JSON envelopes
//   request.rs  — body validation into a ProjectInput
//   handlers.rs — the two route handlers

/// Typed errors rendered as JSON
pub mod error;

/// Structural validation of request bodies
pub mod request;

/// Route handlers
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domain::traits::Predictor;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn Predictor>,
    /// Model variant name reported by /health
    pub variant:   String,
}

impl AppState {
    pub fn new(predictor: Arc<dyn Predictor>, variant: impl Into<String>) -> Self {
        Self { predictor, variant: variant.into() }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/predict_eng", post(handlers::predict_eng))
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
