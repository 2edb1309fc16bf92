// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// One offline prediction from a JSON file, through the same
// validation and feature path the HTTP service uses.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;

use crate::api::request::validate_payload;
use crate::domain::{prediction::Prediction, traits::Predictor};
use crate::infra::artifact::ArtifactStore;
use crate::ml::inferencer::Inferencer;

pub struct PredictUseCase {
    predictor: Box<dyn Predictor>,
}

impl PredictUseCase {
    /// Load the trained artifact from `artifact_dir`.
    pub fn new(artifact_dir: &str) -> Result<Self> {
        let inferencer = Inferencer::from_artifact(&ArtifactStore::new(artifact_dir))?;
        Ok(Self::with_predictor(Box::new(inferencer)))
    }

    pub fn with_predictor(predictor: Box<dyn Predictor>) -> Self {
        Self { predictor }
    }

    /// Validate a JSON body and predict.
    pub fn predict_value(&self, body: &Value) -> Result<Prediction> {
        let input = validate_payload(body, self.predictor.schema())?;
        self.predictor.predict(&input)
    }

    /// Read `path` as a JSON object and predict.
    pub fn predict_file(&self, path: &str) -> Result<Prediction> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Cannot read input file '{path}'"))?;
        let body: Value = serde_json::from_str(&raw)
            .with_context(|| format!("'{path}' is not valid JSON"))?;
        self.predict_value(&body)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::{FeatureSchema, ProjectInput};
    use serde_json::json;
    use std::io::Write;

    struct Fixed;

    impl Predictor for Fixed {
        fn schema(&self) -> FeatureSchema {
            FeatureSchema { uses_text: false }
        }

        fn predict(&self, input: &ProjectInput) -> Result<Prediction> {
            let mut probs = vec![0.0; 10];
            probs[0] = 1.0;
            Prediction::new(probs, input.ratings.0[..10].to_vec(), 1.0)
        }
    }

    #[test]
    fn test_predict_file_round_trip() {
        let mut body = serde_json::Map::new();
        for key in crate::domain::project::NUMERIC_COLUMNS {
            body.insert(key.to_string(), json!(2));
        }
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{}", Value::Object(body)).unwrap();

        let uc = PredictUseCase::with_predictor(Box::new(Fixed));
        let p  = uc.predict_file(f.path().to_str().unwrap()).unwrap();
        assert_eq!(p.contributions, vec![2.0; 10]);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let uc = PredictUseCase::with_predictor(Box::new(Fixed));
        assert!(uc.predict_value(&json!({"MovingParts": 1})).is_err());
    }
}
