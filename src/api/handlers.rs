// ============================================================
// Layer 1 — HTTP Handlers
// ============================================================

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::{error::ApiError, request::validate_payload, AppState};
use crate::domain::prediction::Prediction;

/// POST /predict_eng
///
/// Validates the body against the loaded model's schema, then runs
/// the forward pass on the blocking pool.
pub async fn predict_eng(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Prediction>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::MalformedBody(e.body_text()))?;
    let input      = validate_payload(&body, state.predictor.schema())?;

    let predictor  = Arc::clone(&state.predictor);
    let prediction = tokio::task::spawn_blocking(move || predictor.predict(&input))
        .await
        .map_err(|e| ApiError::Inference(format!("prediction task failed: {e}")))??;

    tracing::info!("Predicted primary field {}", prediction.primary_field);
    Ok(Json(prediction))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status:  String,
    pub variant: String,
    pub version: String,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "ok".to_string(),
        variant: state.variant.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
