// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates one training run, in order:
//
//   Step 1: Load labelled rows from CSV        (Layer 4 - data)
//   Step 2: Check the variant's input needs    (Layer 3 - domain)
//   Step 3: Seeded train/test split            (Layer 4 - data)
//   Step 4: Fit normalizer (+ vectorizer)      (Layer 4/6)
//   Step 5: Featurize, carve validation tail   (Layer 4 - data)
//   Step 6: Run training loop                  (Layer 5 - ml)
//   Step 7: Evaluate on the test split         (Layer 5 - ml)
//   Step 8: Save the artifact bundle           (Layer 6 - infra)
//
// Everything is written to a staging directory first and moved to
// `artifact_dir` only after Step 8 succeeds.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::data::{
    dataset::{EngDataset, EngSample},
    features::Featurizer,
    loader::CsvLoader,
    normalizer::Normalizer,
    splitter::{split_train_test, split_validation_tail},
};
use crate::domain::{
    discipline::NUM_DISCIPLINES,
    project::{ProjectRecord, Ratings, NUM_NUMERIC},
    traits::RecordSource,
};
use crate::infra::{
    artifact::{ArtifactManifest, ArtifactStore, TrainingSummary},
    metrics::MetricsLogger,
    vectorizer::{TextVectorizer, DEFAULT_MAX_TOKENS, DEFAULT_SEQUENCE_LENGTH},
};
use crate::ml::{
    evaluator::evaluate_dataset,
    model::{EngModelConfig, TextBranchConfig},
    trainer::run_training,
    InferBackend,
};

// ─── Model Variant ───────────────────────────────────────────────────────────
/// `numeric` (v1) reads only the eleven ratings; `text` (v2) also
/// embeds the project name, technology and description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelVariant {
    Numeric,
    Text,
}

impl ModelVariant {
    pub fn uses_text(self) -> bool {
        matches!(self, ModelVariant::Text)
    }

    /// Epoch count used when none is given on the command line.
    pub fn default_epochs(self) -> usize {
        match self {
            ModelVariant::Numeric => 100,
            ModelVariant::Text    => 25,
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelVariant::Numeric => "numeric",
            ModelVariant::Text    => "text",
        })
    }
}

impl FromStr for ModelVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numeric" | "v1" => Ok(ModelVariant::Numeric),
            "text" | "v2"    => Ok(ModelVariant::Text),
            other            => bail!("Unknown model variant '{other}' (expected numeric|v1|text|v2)"),
        }
    }
}

// ─── Training Configuration ──────────────────────────────────────────────────
// Every knob of a training run. Serialisable so a run can be
// described in JSON and reproduced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:           String,
    pub artifact_dir:        String,
    pub variant:             ModelVariant,
    pub epochs:              usize,
    pub batch_size:          usize,
    pub lr:                  f64,
    pub seed:                u64,
    pub test_fraction:       f64,
    pub validation_fraction: f64,
    pub max_tokens:          usize,
    pub sequence_length:     usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:           "data/engineering_projects.csv".to_string(),
            artifact_dir:        "artifacts/engineering_model".to_string(),
            variant:             ModelVariant::Numeric,
            epochs:              ModelVariant::Numeric.default_epochs(),
            batch_size:          32,
            lr:                  1e-3,
            seed:                42,
            test_fraction:       0.2,
            validation_fraction: 0.2,
            max_tokens:          DEFAULT_MAX_TOKENS,
            sequence_length:     DEFAULT_SEQUENCE_LENGTH,
        }
    }
}

impl TrainConfig {
    fn validate(&self) -> Result<()> {
        ensure!(self.batch_size > 0, "batch_size must be positive");
        ensure!(self.lr > 0.0 && self.lr.is_finite(), "lr must be a positive number");
        ensure!(
            (0.0..1.0).contains(&self.test_fraction),
            "test_fraction must be in [0, 1), got {}",
            self.test_fraction
        );
        ensure!(
            (0.0..1.0).contains(&self.validation_fraction),
            "validation_fraction must be in [0, 1), got {}",
            self.validation_fraction
        );
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline and return what was written to the manifest.
    pub fn execute(&self) -> Result<TrainingSummary> {
        let cfg = &self.config;
        cfg.validate()?;
        let store = ArtifactStore::new(&cfg.artifact_dir);
        store.ensure_vacant()?;

        // ── Step 1: Load rows ─────────────────────────────────────────────────
        tracing::info!("Loading training data from '{}'", cfg.data_path);
        let records = CsvLoader::new(&cfg.data_path).load_all()?;
        ensure!(!records.is_empty(), "No rows in '{}'", cfg.data_path);
        let total_records = records.len();

        // ── Step 2: Text variant needs all three text columns ─────────────────
        if cfg.variant.uses_text() {
            let missing = records.iter().filter(|r| r.input.text.is_none()).count();
            if missing > 0 {
                bail!(
                    "The text variant needs ProjectName, PrimaryTechnology and ProjectDescription; \
                     {missing} of {total_records} rows lack them"
                );
            }
        }

        // ── Step 3: Held-out test split ───────────────────────────────────────
        let (train_records, test_records) = split_train_test(records, cfg.test_fraction, cfg.seed);
        tracing::info!(
            "Split: {} train, {} test (seed={})",
            train_records.len(),
            test_records.len(),
            cfg.seed
        );
        ensure!(!train_records.is_empty(), "Training split is empty; lower test_fraction");

        // ── Step 4: Fit adapters on the train split only ──────────────────────
        let ratings: Vec<Ratings> = train_records.iter().map(|r| r.input.ratings).collect();
        let normalizer = Normalizer::fit(&ratings)?;

        let vectorizer = if cfg.variant.uses_text() {
            let texts: Vec<String> = train_records
                .iter()
                .filter_map(|r| r.input.text.as_ref().map(|t| t.combined()))
                .collect();
            Some(TextVectorizer::fit(&texts, cfg.max_tokens, cfg.sequence_length)?)
        } else {
            None
        };

        let text_cfg = vectorizer
            .as_ref()
            .map(|v| TextBranchConfig::new(v.vocab_size(), v.sequence_length()));
        let model_cfg = EngModelConfig::new(NUM_NUMERIC, NUM_DISCIPLINES, NUM_DISCIPLINES)
            .with_text(text_cfg);

        let featurizer = Featurizer::new(normalizer, vectorizer);

        // ── Step 5: Featurize and reserve the validation tail ─────────────────
        let train_samples = featurize(&featurizer, &train_records)?;
        let test_samples  = featurize(&featurizer, &test_records)?;
        let (fit_samples, val_samples) = split_validation_tail(train_samples, cfg.validation_fraction);
        tracing::info!(
            "Fitting on {} samples, validating on {}",
            fit_samples.len(),
            val_samples.len()
        );

        // ── Step 6: Training loop ─────────────────────────────────────────────
        let staging = store.staging()?;
        let logger  = MetricsLogger::new(staging.dir())?;
        let outcome = run_training(
            cfg,
            &model_cfg,
            EngDataset::new(fit_samples),
            EngDataset::new(val_samples),
            &logger,
        )?;

        // ── Step 7: Held-out test metrics ─────────────────────────────────────
        let device = Default::default();
        let test = evaluate_dataset::<InferBackend>(
            &outcome.model,
            EngDataset::new(test_samples),
            cfg.batch_size,
            &device,
        );
        if test.samples > 0 {
            tracing::info!(
                "Test: loss={:.4} acc={:.1}% contrib_mse={:.3} complexity_mse={:.3} (n={})",
                test.loss,
                test.primary_accuracy * 100.0,
                test.contributions_mse,
                test.complexity_mse,
                test.samples
            );
        } else {
            tracing::warn!("Test split is empty; no held-out metrics");
        }

        // ── Step 8: Persist ───────────────────────────────────────────────────
        let summary = TrainingSummary {
            records:          total_records,
            epochs:           cfg.epochs,
            batch_size:       cfg.batch_size,
            learning_rate:    cfg.lr,
            seed:             cfg.seed,
            final_train_loss: outcome.history.last().map(|m| m.train_loss).filter(|l| l.is_finite()),
            test:             Some(test).filter(|t| t.samples > 0 && t.is_finite()),
        };

        let mut manifest = ArtifactManifest::new(cfg.variant, featurizer.normalizer().clone(), model_cfg);
        manifest.summary = Some(summary.clone());
        staging
            .save(&manifest, &outcome.model, featurizer.vectorizer())
            .context("Failed to write the trained artifact")?;
        store.commit(staging)?;

        Ok(summary)
    }
}

fn featurize(featurizer: &Featurizer, records: &[ProjectRecord]) -> Result<Vec<EngSample>> {
    records.iter().map(|r| featurizer.sample(r)).collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_parsing_accepts_aliases() {
        assert_eq!("v1".parse::<ModelVariant>().unwrap(), ModelVariant::Numeric);
        assert_eq!("Text".parse::<ModelVariant>().unwrap(), ModelVariant::Text);
        assert!("v3".parse::<ModelVariant>().is_err());
    }

    #[test]
    fn test_variant_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&ModelVariant::Text).unwrap(), "\"text\"");
        assert_eq!(ModelVariant::Numeric.to_string(), "numeric");
    }

    #[test]
    fn test_default_epochs_per_variant() {
        assert_eq!(ModelVariant::Numeric.default_epochs(), 100);
        assert_eq!(ModelVariant::Text.default_epochs(), 25);
    }

    #[test]
    fn test_config_rejects_bad_fractions() {
        let mut cfg = TrainConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.test_fraction = 1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_missing_data_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            data_path:    dir.path().join("absent.csv").display().to_string(),
            artifact_dir: dir.path().join("out").display().to_string(),
            ..TrainConfig::default()
        };
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }

    #[test]
    fn test_populated_artifact_dir_is_refused_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("history.csv"), "epoch\n1\n").unwrap();

        let cfg = TrainConfig {
            data_path:    dir.path().join("absent.csv").display().to_string(),
            artifact_dir: out.display().to_string(),
            ..TrainConfig::default()
        };
        let err = TrainUseCase::new(cfg).execute().unwrap_err();
        assert!(err.to_string().contains("not empty"), "{err}");
        assert_eq!(std::fs::read_to_string(out.join("history.csv")).unwrap(), "epoch\n1\n");
    }
}
