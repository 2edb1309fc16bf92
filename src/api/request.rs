// ============================================================
// Layer 1 — Request Validation
// ============================================================
// Structural check of a /predict_eng body before any feature
// extraction happens. All problems are collected, not just the
// first, so a client can fix its payload in one round trip.
//
//   numeric keys  — present, JSON number, finite as f32
//   text keys     — present and a JSON string (text models only)
//   anything else — ignored

use serde_json::Value;

use crate::api::error::ApiError;
use crate::domain::project::{
    FeatureSchema, ProjectInput, ProjectText, Ratings, NUMERIC_COLUMNS, NUM_NUMERIC, TEXT_COLUMNS,
};

/// Turn a JSON body into a ProjectInput for a model with `schema`.
pub fn validate_payload(body: &Value, schema: FeatureSchema) -> Result<ProjectInput, ApiError> {
    let obj = body
        .as_object()
        .ok_or_else(|| ApiError::MalformedBody("request body must be a JSON object".to_string()))?;

    let mut missing = Vec::new();
    let mut invalid = Vec::new();

    let mut ratings = [0.0f32; NUM_NUMERIC];
    for (slot, key) in ratings.iter_mut().zip(NUMERIC_COLUMNS) {
        match obj.get(key) {
            None => missing.push(key.to_string()),
            Some(v) => match v.as_f64().map(|x| x as f32).filter(|x| x.is_finite()) {
                Some(x) => *slot = x,
                None    => invalid.push(key.to_string()),
            },
        }
    }

    let mut text_fields: Vec<String> = Vec::with_capacity(TEXT_COLUMNS.len());
    if schema.uses_text {
        for key in TEXT_COLUMNS {
            match obj.get(key) {
                None => missing.push(key.to_string()),
                Some(Value::String(s)) => text_fields.push(s.clone()),
                Some(_) => invalid.push(key.to_string()),
            }
        }
    }

    if !missing.is_empty() || !invalid.is_empty() {
        return Err(ApiError::Validation { missing, invalid });
    }

    let text = match text_fields.as_slice() {
        [name, technology, description] => Some(ProjectText::new(
            name.as_str(),
            technology.as_str(),
            description.as_str(),
        )),
        _ => None,
    };

    Ok(ProjectInput { ratings: Ratings(ratings), text })
}
