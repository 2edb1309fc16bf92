// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only. Each use case tells the other
// layers what to do in which order:
//
//   train_use_case.rs   — CSV → fitted adapters → trained artifact
//   serve_use_case.rs   — artifact → AppState → HTTP server
//   predict_use_case.rs — artifact + JSON file → one Prediction
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// The HTTP prediction service
pub mod serve_use_case;

// Single offline prediction
pub mod predict_use_case;
