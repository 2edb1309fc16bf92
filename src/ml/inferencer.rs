// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Runs one project through a trained model:
//
//   ProjectInput ─▶ Featurizer ─▶ [1, 11] (+ [1, seq_len] ids)
//                                    │
//                                    ▼
//                                EngModel
//                                    │
//            softmax(primary) ◀──────┼──────▶ contributions, complexity
//
// The model is only read, never trained, so the same input always
// gives the same output. Dropout and batch norm run in inference
// mode because InferBackend has no autodiff.

use anyhow::{anyhow, ensure, Result};
use burn::{prelude::*, tensor::activation::softmax};
use std::sync::Mutex;

use crate::data::features::Featurizer;
use crate::domain::{
    prediction::Prediction,
    project::{FeatureSchema, ProjectInput, NUM_NUMERIC},
    traits::Predictor,
};
use crate::infra::artifact::ArtifactStore;
use crate::ml::{model::EngModel, InferBackend};

type Device = <InferBackend as Backend>::Device;

pub struct Inferencer {
    model:      Mutex<EngModel<InferBackend>>,
    featurizer: Featurizer,
    device:     Device,
}

impl Inferencer {
    /// Load manifest, weights and adapters from an artifact directory.
    pub fn from_artifact(store: &ArtifactStore) -> Result<Self> {
        let device: Device = Default::default();
        let manifest       = store.load_manifest()?;
        let model          = store.load_model::<InferBackend>(&manifest, &device)?;
        let vectorizer     = store.load_vectorizer(&manifest)?;
        let featurizer     = Featurizer::new(manifest.normalizer.clone(), vectorizer);

        tracing::info!(
            "Model loaded from '{}' (variant={})",
            store.dir().display(),
            manifest.variant
        );
        Ok(Self::from_parts(model, featurizer))
    }

    /// Wrap an in-memory model, e.g. one fresh from training.
    pub fn from_parts(model: EngModel<InferBackend>, featurizer: Featurizer) -> Self {
        Self {
            model: Mutex::new(model),
            featurizer,
            device: Default::default(),
        }
    }
}

impl Predictor for Inferencer {
    fn schema(&self) -> FeatureSchema {
        self.featurizer.schema()
    }

    fn predict(&self, input: &ProjectInput) -> Result<Prediction> {
        let encoded = self.featurizer.encode(input)?;

        let numeric = Tensor::<InferBackend, 1>::from_floats(encoded.numeric.as_slice(), &self.device)
            .reshape([1, NUM_NUMERIC]);
        let tokens = encoded.tokens.map(|ids| {
            let seq_len        = ids.len();
            let ids: Vec<i32>  = ids.into_iter().map(|id| id as i32).collect();
            Tensor::<InferBackend, 1, Int>::from_ints(ids.as_slice(), &self.device)
                .reshape([1, seq_len])
        });

        let output = {
            let model = self.model.lock().map_err(|_| anyhow!("Model lock poisoned"))?;
            ensure!(
                model.accepts(tokens.is_some()),
                "Featurizer and model disagree on text input (model uses text: {})",
                model.uses_text()
            );
            model.forward(numeric, tokens)
        };

        let probs: Vec<f32> = softmax(output.primary_logits, 1)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read primary-field probabilities: {e:?}"))?;
        let contributions: Vec<f32> = output.contributions
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read contributions: {e:?}"))?;
        let complexity: f32 = output.complexity.into_scalar().elem::<f32>();

        tracing::debug!("Prediction: probs={:?} complexity={:.3}", probs, complexity);
        Prediction::new(probs, contributions, complexity)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::normalizer::Normalizer;
    use crate::domain::project::{ProjectText, Ratings};
    use crate::infra::vectorizer::TextVectorizer;
    use crate::ml::model::{EngModelConfig, TextBranchConfig};

    fn normalizer() -> Normalizer {
        Normalizer::fit(&[Ratings([1.0; NUM_NUMERIC]), Ratings([5.0; NUM_NUMERIC])]).unwrap()
    }

    fn input(text: Option<ProjectText>) -> ProjectInput {
        ProjectInput { ratings: Ratings([3.0; NUM_NUMERIC]), text }
    }

    #[test]
    fn test_numeric_prediction_shapes() {
        let model = EngModelConfig::new(11, 10, 10).init::<InferBackend>(&Default::default());
        let inf   = Inferencer::from_parts(model, Featurizer::new(normalizer(), None));

        let p = inf.predict(&input(None)).unwrap();
        assert_eq!(p.primary_field_probs.len(), 10);
        assert_eq!(p.contributions.len(), 10);
        let sum: f32 = p.primary_field_probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert!(!inf.schema().uses_text);
    }

    #[test]
    fn test_text_model_requires_text() {
        let texts = vec!["drone flight control".to_string()];
        let v     = TextVectorizer::fit(&texts, 50, 8).unwrap();
        let cfg   = EngModelConfig::new(11, 10, 10)
            .with_text(Some(TextBranchConfig::new(v.vocab_size(), 8)));
        let model = cfg.init::<InferBackend>(&Default::default());
        let inf   = Inferencer::from_parts(model, Featurizer::new(normalizer(), Some(v)));

        assert!(inf.schema().uses_text);
        assert!(inf.predict(&input(None)).is_err());

        let text = ProjectText::new("Drone", "Flight Control", "autonomous quadrotor");
        let a = inf.predict(&input(Some(text.clone()))).unwrap();
        let b = inf.predict(&input(Some(text))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mismatched_model_and_featurizer_is_an_error() {
        let v     = TextVectorizer::fit(&["pump valve".to_string()], 50, 8).unwrap();
        let cfg   = EngModelConfig::new(11, 10, 10)
            .with_text(Some(TextBranchConfig::new(v.vocab_size(), 8)));
        let model = cfg.init::<InferBackend>(&Default::default());
        let inf   = Inferencer::from_parts(model, Featurizer::new(normalizer(), None));

        let err = inf.predict(&input(None)).unwrap_err();
        assert!(err.to_string().contains("disagree"), "{err}");
    }
}
