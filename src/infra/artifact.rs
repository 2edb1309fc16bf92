// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Saves and restores a trained model together with the fitted
// adapters it depends on. One directory per training run:
//
//   <artifact_dir>/
//     manifest.json    ← format version, variant, column order,
//                        class order, normalizer statistics,
//                        model config, training summary
//     model.mpk.gz     ← weights (Burn CompactRecorder)
//     tokenizer.json   ← vocabulary (text variant only)
//     history.csv      ← per-epoch metrics (MetricsLogger)
//
// The manifest is validated on load. An artifact whose column
// order, class order or vocabulary disagrees with this build is
// refused instead of silently producing garbage predictions.
//
// Training writes into a sibling `<artifact_dir>.partial` directory
// and renames it into place once every file is on disk, so a run
// that fails halfway never leaves a half-written bundle behind.
// An existing non-empty artifact directory is never overwritten.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{bail, ensure, Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::ModelVariant;
use crate::data::normalizer::Normalizer;
use crate::domain::{
    discipline::{Discipline, NUM_DISCIPLINES},
    project::{NUMERIC_COLUMNS, NUM_NUMERIC},
};
use crate::infra::vectorizer::TextVectorizer;
use crate::ml::{evaluator::EvalMetrics, model::{EngModel, EngModelConfig}};

/// Bumped whenever the manifest layout or feature pipeline changes.
pub const FORMAT_VERSION: u32 = 1;

const MANIFEST_FILE: &str = "manifest.json";
const MODEL_FILE:    &str = "model";

/// Provenance of a training run, stored for inspection only.
/// JSON has no NaN, so metrics that never got a finite value are
/// stored as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub records:          usize,
    pub epochs:           usize,
    pub batch_size:       usize,
    pub learning_rate:    f64,
    pub seed:             u64,
    pub final_train_loss: Option<f64>,
    pub test:             Option<EvalMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub format_version:  u32,
    pub variant:         ModelVariant,
    pub numeric_columns: Vec<String>,
    pub classes:         Vec<String>,
    pub normalizer:      Normalizer,
    pub model:           EngModelConfig,
    pub summary:         Option<TrainingSummary>,
}

impl ArtifactManifest {
    pub fn new(variant: ModelVariant, normalizer: Normalizer, model: EngModelConfig) -> Self {
        Self {
            format_version:  FORMAT_VERSION,
            variant,
            numeric_columns: NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
            classes:         Discipline::names(),
            normalizer,
            model,
            summary:         None,
        }
    }

    /// Check that this artifact was produced with the feature
    /// schema this build extracts.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.format_version == FORMAT_VERSION,
            "Artifact format version {} is not supported (expected {})",
            self.format_version,
            FORMAT_VERSION
        );
        ensure!(
            self.numeric_columns.iter().map(String::as_str).eq(NUMERIC_COLUMNS.iter().copied()),
            "Artifact numeric columns {:?} do not match the expected order {:?}",
            self.numeric_columns,
            NUMERIC_COLUMNS
        );
        ensure!(
            self.classes == Discipline::names(),
            "Artifact class order {:?} does not match {:?}",
            self.classes,
            Discipline::names()
        );
        ensure!(self.normalizer.is_well_formed(), "Artifact normalizer statistics are not {NUM_NUMERIC} wide");
        ensure!(
            self.model.numeric_features == NUM_NUMERIC
                && self.model.num_classes == NUM_DISCIPLINES
                && self.model.num_contributions == NUM_DISCIPLINES,
            "Artifact model dimensions do not match the feature schema"
        );
        ensure!(
            self.model.uses_text() == self.variant.uses_text(),
            "Artifact variant '{}' disagrees with its model configuration",
            self.variant
        );
        Ok(())
    }
}

/// Reads and writes one artifact directory.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fail if the directory already holds files.
    pub fn ensure_vacant(&self) -> Result<()> {
        if !self.dir.exists() {
            return Ok(());
        }
        let mut entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot read '{}'", self.dir.display()))?;
        if entries.next().is_some() {
            bail!(
                "Artifact directory '{}' is not empty; choose another --artifact-dir or remove it",
                self.dir.display()
            );
        }
        Ok(())
    }

    /// A fresh, empty `<dir>.partial` sibling to write a run into.
    /// Leftovers from an earlier failed run are removed.
    pub fn staging(&self) -> Result<ArtifactStore> {
        let name = self
            .dir
            .file_name()
            .with_context(|| format!("Artifact path '{}' has no directory name", self.dir.display()))?;
        let mut partial = name.to_os_string();
        partial.push(".partial");
        let path = self.dir.with_file_name(partial);

        if path.exists() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("Cannot clear stale '{}'", path.display()))?;
        }
        fs::create_dir_all(&path)
            .with_context(|| format!("Cannot create '{}'", path.display()))?;
        Ok(ArtifactStore::new(path))
    }

    /// Move a completed staging directory into this store's place.
    pub fn commit(&self, staging: ArtifactStore) -> Result<()> {
        self.ensure_vacant()?;
        if self.dir.exists() {
            fs::remove_dir(&self.dir)
                .with_context(|| format!("Cannot replace empty '{}'", self.dir.display()))?;
        }
        if let Some(parent) = self.dir.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        fs::rename(&staging.dir, &self.dir).with_context(|| {
            format!(
                "Cannot move '{}' to '{}'",
                staging.dir.display(),
                self.dir.display()
            )
        })?;
        tracing::info!("Artifact committed to '{}'", self.dir.display());
        Ok(())
    }

    /// Write manifest, weights and (text variant) vocabulary.
    pub fn save<B: Backend>(
        &self,
        manifest:   &ArtifactManifest,
        model:      &EngModel<B>,
        vectorizer: Option<&TextVectorizer>,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create artifact directory '{}'", self.dir.display()))?;

        let model_path = self.dir.join(MODEL_FILE);
        CompactRecorder::new()
            .record(model.clone().into_record(), model_path.clone())
            .with_context(|| format!("Failed to save weights to '{}'", model_path.display()))?;

        if let Some(v) = vectorizer {
            v.save(&self.dir)?;
        }

        let manifest_path = self.dir.join(MANIFEST_FILE);
        fs::write(&manifest_path, serde_json::to_string_pretty(manifest)?)
            .with_context(|| format!("Cannot write manifest to '{}'", manifest_path.display()))?;

        tracing::info!("Artifact saved to '{}'", self.dir.display());
        Ok(())
    }

    /// Read and validate the manifest.
    pub fn load_manifest(&self) -> Result<ArtifactManifest> {
        let path = self.dir.join(MANIFEST_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Run 'train' to produce an artifact first.",
                path.display()
            )
        })?;

        let manifest: ArtifactManifest = serde_json::from_str(&json)
            .with_context(|| format!("Malformed manifest '{}'", path.display()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Rebuild the architecture from the manifest and restore the weights.
    pub fn load_model<B: Backend>(
        &self,
        manifest: &ArtifactManifest,
        device:   &B::Device,
    ) -> Result<EngModel<B>> {
        let path  = self.dir.join(MODEL_FILE);
        let model = manifest.model.init::<B>(device);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load weights '{}'", path.display()))?;

        tracing::info!("Loaded weights from '{}'", path.display());
        Ok(model.load_record(record))
    }

    /// Load the vocabulary for text models and check it fits the
    /// embedding table.
    pub fn load_vectorizer(&self, manifest: &ArtifactManifest) -> Result<Option<TextVectorizer>> {
        let Some(text_cfg) = &manifest.model.text else {
            return Ok(None);
        };

        let v = TextVectorizer::load(&self.dir, text_cfg.seq_len)?;
        if v.vocab_size() != text_cfg.vocab_size {
            bail!(
                "Tokenizer vocabulary has {} entries but the model embeds {}",
                v.vocab_size(),
                text_cfg.vocab_size
            );
        }
        Ok(Some(v))
    }
}
