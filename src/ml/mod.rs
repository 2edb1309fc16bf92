// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All network code lives here. Other layers hand this layer
// plain samples and get back plain numbers.
//
//   model.rs      — multi-output network: optional text branch
//                   (embedding + average pooling), batch norm,
//                   dense stack, and the three heads
//
//   trainer.rs    — Adam training loop with per-epoch validation
//
//   evaluator.rs  — gradient-free loss and metric pass over a split
//
//   inferencer.rs — loads an artifact and serves single predictions
//
// Backend: NdArray on the CPU unless the `wgpu` feature is enabled.
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Multi-output engineering field model
pub mod model;

/// Training loop with validation and history logging
pub mod trainer;

/// Loss and metrics over a DataLoader
pub mod evaluator;

/// Inference engine behind the Predictor trait
pub mod inferencer;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

pub type TrainBackend = burn::backend::Autodiff<InferBackend>;
