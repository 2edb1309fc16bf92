//! Integration tests for the prediction service
//!
//! The router is driven with `tower::ServiceExt::oneshot`, first
//! against a stub predictor (routing, envelopes, status codes), then
//! against a real, untrained network (shapes, probabilities,
//! determinism, the Drone scenario).

use anyhow::{bail, Result};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

use eng_field_predictor::api::{build_router, AppState};
use eng_field_predictor::data::{features::Featurizer, normalizer::Normalizer};
use eng_field_predictor::domain::{
    prediction::Prediction,
    project::{FeatureSchema, ProjectInput, Ratings, NUMERIC_COLUMNS, NUM_NUMERIC},
    traits::Predictor,
};
use eng_field_predictor::infra::vectorizer::TextVectorizer;
use eng_field_predictor::ml::{
    inferencer::Inferencer,
    model::{EngModelConfig, TextBranchConfig},
    InferBackend,
};

// =============================================================================
// Helpers
// =============================================================================

/// Returns fixed outputs; contributions deliberately sum to 37.
struct StubPredictor {
    uses_text: bool,
}

impl Predictor for StubPredictor {
    fn schema(&self) -> FeatureSchema {
        FeatureSchema { uses_text: self.uses_text }
    }

    fn predict(&self, _input: &ProjectInput) -> Result<Prediction> {
        let mut probs = vec![0.02f32; 10];
        probs[6] = 0.82;
        let mut contributions = vec![3.0f32; 10];
        contributions[0] = 10.0;
        Prediction::new(probs, contributions, 2.5)
    }
}

struct FailingPredictor;

impl Predictor for FailingPredictor {
    fn schema(&self) -> FeatureSchema {
        FeatureSchema { uses_text: false }
    }

    fn predict(&self, _input: &ProjectInput) -> Result<Prediction> {
        bail!("weights unavailable")
    }
}

fn app_with(predictor: Arc<dyn Predictor>, variant: &str) -> Router {
    build_router(AppState::new(predictor, variant))
}

fn untrained_numeric_app() -> Router {
    let device     = Default::default();
    let model      = EngModelConfig::new(11, 10, 10).init::<InferBackend>(&device);
    let normalizer = Normalizer::fit(&[Ratings([1.0; NUM_NUMERIC]), Ratings([5.0; NUM_NUMERIC])]).unwrap();
    let inferencer = Inferencer::from_parts(model, Featurizer::new(normalizer, None));
    app_with(Arc::new(inferencer), "numeric")
}

fn untrained_text_app() -> Router {
    let texts = vec![
        "Drone Flight Control autonomous quadrotor".to_string(),
        "Bridge Structural Analysis suspension span".to_string(),
    ];
    let vectorizer = TextVectorizer::fit(&texts, 100, 16).unwrap();
    let cfg = EngModelConfig::new(11, 10, 10)
        .with_text(Some(TextBranchConfig::new(vectorizer.vocab_size(), 16)));
    let model      = cfg.init::<InferBackend>(&Default::default());
    let normalizer = Normalizer::fit(&[Ratings([1.0; NUM_NUMERIC]), Ratings([5.0; NUM_NUMERIC])]).unwrap();
    let inferencer = Inferencer::from_parts(model, Featurizer::new(normalizer, Some(vectorizer)));
    app_with(Arc::new(inferencer), "text")
}

fn numeric_body() -> Value {
    let values = [3, 2, 1, 5, 4, 5, 2, 1, 2, 4, 2];
    let mut body = serde_json::Map::new();
    for (key, v) in NUMERIC_COLUMNS.iter().zip(values) {
        body.insert(key.to_string(), json!(v));
    }
    Value::Object(body)
}

fn drone_body() -> Value {
    let mut body = numeric_body();
    let obj = body.as_object_mut().unwrap();
    obj.insert("ProjectName".into(), json!("Drone"));
    obj.insert("PrimaryTechnology".into(), json!("Flight Control"));
    obj.insert("ProjectDescription".into(), json!("autonomous quadrotor"));
    body
}

fn post_json(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict_eng")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status   = response.status();
    let bytes    = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn floats(v: &Value) -> Vec<f64> {
    v.as_array().unwrap().iter().map(|x| x.as_f64().unwrap()).collect()
}

// =============================================================================
// Stub predictor: routing and envelopes
// =============================================================================

#[tokio::test]
async fn test_health_reports_variant() {
    let app = app_with(Arc::new(StubPredictor { uses_text: false }), "numeric");
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["variant"], "numeric");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_no_prediction_history_route() {
    let app = app_with(Arc::new(StubPredictor { uses_text: false }), "numeric");
    let req = Request::builder().uri("/get_predictions/1").body(Body::empty()).unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_success_body_shape() {
    let app = app_with(Arc::new(StubPredictor { uses_text: false }), "numeric");
    let (status, body) = send(app, post_json(&numeric_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(floats(&body["primary_field_probs"]).len(), 10);
    assert_eq!(floats(&body["contributions"]).len(), 10);
    assert_eq!(body["complexity"].as_f64().unwrap(), 2.5);
    assert_eq!(body["primary_field"], "Aerospace");
}

#[tokio::test]
async fn test_contributions_are_passed_through_unnormalised() {
    let app = app_with(Arc::new(StubPredictor { uses_text: false }), "numeric");
    let (_, body) = send(app, post_json(&numeric_body())).await;

    let sum: f64 = floats(&body["contributions"]).iter().sum();
    assert!((sum - 37.0).abs() < 1e-4, "contributions were rescaled: sum={sum}");
}

#[tokio::test]
async fn test_missing_key_gives_422_envelope() {
    let app = app_with(Arc::new(StubPredictor { uses_text: false }), "numeric");
    let mut body = numeric_body();
    body.as_object_mut().unwrap().remove("Aerodynamics");

    let (status, err) = send(app, post_json(&body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(err["error"].is_string());
    assert_eq!(err["missing"], json!(["Aerodynamics"]));
    assert_eq!(err["invalid"], json!([]));
}

#[tokio::test]
async fn test_text_model_requires_text_keys() {
    let app = app_with(Arc::new(StubPredictor { uses_text: true }), "text");
    let (status, err) = send(app, post_json(&numeric_body())).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        err["missing"],
        json!(["ProjectName", "PrimaryTechnology", "ProjectDescription"])
    );
}

#[tokio::test]
async fn test_string_rating_is_invalid() {
    let app = app_with(Arc::new(StubPredictor { uses_text: false }), "numeric");
    let mut body = numeric_body();
    body.as_object_mut().unwrap().insert("MovingParts".into(), json!("3"));

    let (status, err) = send(app, post_json(&body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["invalid"], json!(["MovingParts"]));
}

#[tokio::test]
async fn test_malformed_json_gives_400() {
    let app = app_with(Arc::new(StubPredictor { uses_text: false }), "numeric");
    let req = Request::builder()
        .method("POST")
        .uri("/predict_eng")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, err) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].is_string());
}

#[tokio::test]
async fn test_non_object_body_gives_400() {
    let app = app_with(Arc::new(StubPredictor { uses_text: false }), "numeric");
    let (status, _) = send(app, post_json(&json!([1, 2, 3]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inference_failure_gives_500() {
    let app = app_with(Arc::new(FailingPredictor), "numeric");
    let (status, err) = send(app, post_json(&numeric_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(err["error"].as_str().unwrap().contains("weights unavailable"));
}

// =============================================================================
// Real (untrained) network
// =============================================================================

#[tokio::test]
async fn test_primary_probs_form_a_distribution() {
    let (status, body) = send(untrained_numeric_app(), post_json(&numeric_body())).await;
    assert_eq!(status, StatusCode::OK);

    let probs = floats(&body["primary_field_probs"]);
    assert_eq!(probs.len(), 10);
    assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    let sum: f64 = probs.iter().sum();
    assert!((sum - 1.0).abs() < 1e-4, "sum={sum}");
}

#[tokio::test]
async fn test_contributions_not_forced_to_100() {
    let (_, body) = send(untrained_numeric_app(), post_json(&numeric_body())).await;

    let contributions = floats(&body["contributions"]);
    assert_eq!(contributions.len(), 10);
    let sum: f64 = contributions.iter().sum();
    assert!((sum - 100.0).abs() > 1e-3, "an untrained head should not land on 100");
}

#[tokio::test]
async fn test_replay_is_deterministic() {
    let app = untrained_text_app();
    let (_, first)  = send(app.clone(), post_json(&drone_body())).await;
    let (_, second) = send(app, post_json(&drone_body())).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_drone_scenario() {
    let (status, body) = send(untrained_text_app(), post_json(&drone_body())).await;
    assert_eq!(status, StatusCode::OK);

    let probs = floats(&body["primary_field_probs"]);
    assert_eq!(probs.len(), 10);
    let sum: f64 = probs.iter().sum();
    assert!((sum - 1.0).abs() < 1e-4);

    assert_eq!(floats(&body["contributions"]).len(), 10);
    assert!(body["complexity"].is_number());
    assert!(body["primary_field"].is_string());
}
