#![recursion_limit = "256"]

//! Engineering field predictor: a multi-output network that reads a
//! project's eleven difficulty ratings (and optionally its name,
//! technology and description) and predicts the primary engineering
//! discipline, the effort split across ten disciplines, and an overall
//! complexity score. Trained offline from CSV, served over HTTP.

pub mod api;
pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod infra;
pub mod ml;
