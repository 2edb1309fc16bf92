// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain structs, enums and traits describing projects and
// predictions. No burn types, no file or network I/O.

/// The ten engineering disciplines and their fixed order
pub mod discipline;

/// Ratings, text fields, labels and the feature schema
pub mod project;

/// The three model outputs returned to callers
pub mod prediction;

/// Abstractions other layers implement
pub mod traits;
