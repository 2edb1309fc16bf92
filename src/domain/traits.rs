// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams the application layer programs against:
//
//   RecordSource → anything that yields labelled training rows
//                  (CsvLoader today)
//   Predictor    → anything that turns a ProjectInput into a
//                  Prediction (the burn Inferencer, or a stub
//                  in handler tests)

use anyhow::Result;

use crate::domain::{
    prediction::Prediction,
    project::{FeatureSchema, ProjectInput, ProjectRecord},
};

// ─── RecordSource ─────────────────────────────────────────────────────────────
pub trait RecordSource {
    /// Load every labelled record from this source.
    fn load_all(&self) -> Result<Vec<ProjectRecord>>;
}

// ─── Predictor ────────────────────────────────────────────────────────────────
/// Shared by every request handler, hence Send + Sync.
pub trait Predictor: Send + Sync {
    /// Inputs the underlying model expects.
    fn schema(&self) -> FeatureSchema;

    /// Run one forward pass. Must not mutate model state, so
    /// replaying the same input yields the same output.
    fn predict(&self, input: &ProjectInput) -> Result<Prediction>;
}
