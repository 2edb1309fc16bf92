// ============================================================
// Layer 1 — API Errors
// ============================================================
// Every failure a request can hit, mapped to a status code and a
// JSON envelope:
//
//   MalformedBody → 400 {"error"}
//   Validation    → 422 {"error", "missing", "invalid"}
//   Inference     → 500 {"error"}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Request failed validation: {}", describe(.missing, .invalid))]
    Validation {
        missing: Vec<String>,
        invalid: Vec<String>,
    },

    #[error("Inference failed: {0}")]
    Inference(String),
}

fn describe(missing: &[String], invalid: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing {}", missing.join(", ")));
    }
    if !invalid.is_empty() {
        parts.push(format!("invalid {}", invalid.join(", ")));
    }
    parts.join("; ")
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_)  => StatusCode::BAD_REQUEST,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inference(_)      => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Inference(format!("{e:#}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status  = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("{message}");
        } else {
            tracing::debug!("Rejected request: {message}");
        }

        let body = match self {
            ApiError::Validation { missing, invalid } => json!({
                "error":   message,
                "missing": missing,
                "invalid": invalid,
            }),
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::MalformedBody("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Validation { missing: vec![], invalid: vec![] }.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::Inference("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_message_names_fields() {
        let e = ApiError::Validation {
            missing: vec!["MovingParts".into()],
            invalid: vec!["Aerodynamics".into()],
        };
        let msg = e.to_string();
        assert!(msg.contains("missing MovingParts"));
        assert!(msg.contains("invalid Aerodynamics"));
    }
}
