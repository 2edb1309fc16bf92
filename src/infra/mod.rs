// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence and bookkeeping shared by training and serving:
//
//   artifact.rs   — manifest + weights + vocabulary bundle,
//                   validated against the feature schema on load
//
//   vectorizer.rs — text vocabulary fit, encode, save and load
//                   through the `tokenizers` crate
//
//   metrics.rs    — per-epoch history written to CSV
//
// Reference: Burn Book §5 (Checkpointing)

/// Trained artifact saving, loading and validation
pub mod artifact;

/// Text vocabulary adapter
pub mod vectorizer;

/// Training history CSV logger
pub mod metrics;
