// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `serve` and `predict`
// and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::{ModelVariant, TrainConfig};
use crate::infra::vectorizer::{DEFAULT_MAX_TOKENS, DEFAULT_SEQUENCE_LENGTH};

pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts/engineering_model";
pub const DEFAULT_BIND_ADDR:    &str = "127.0.0.1:5000";

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a model on a CSV of labelled projects
    Train(TrainArgs),

    /// Serve POST /predict_eng from a trained artifact
    Serve(ServeArgs),

    /// Predict once from a JSON file and print the result
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV with the eleven ratings, labels and (for text) the text columns
    #[arg(long)]
    pub data: String,

    /// Where manifest, weights, vocabulary and history are written
    #[arg(long, env = "ENG_ARTIFACT_DIR", default_value = DEFAULT_ARTIFACT_DIR)]
    pub artifact_dir: String,

    /// numeric (v1) or text (v2)
    #[arg(long, default_value = "numeric")]
    pub variant: ModelVariant,

    /// Passes over the training data [default: 100 numeric, 25 text]
    #[arg(long)]
    pub epochs: Option<usize>,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Seed for the test split, batch shuffling and weight init
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Share of rows held out for the final test evaluation
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Tail share of the train split used for per-epoch validation
    #[arg(long, default_value_t = 0.2)]
    pub validation_fraction: f64,

    /// Vocabulary size including padding and unknown ids
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: usize,

    /// Token ids per project text, after truncation or padding
    #[arg(long, default_value_t = DEFAULT_SEQUENCE_LENGTH)]
    pub sequence_length: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:           a.data,
            artifact_dir:        a.artifact_dir,
            variant:             a.variant,
            epochs:              a.epochs.unwrap_or_else(|| a.variant.default_epochs()),
            batch_size:          a.batch_size,
            lr:                  a.lr,
            seed:                a.seed,
            test_fraction:       a.test_fraction,
            validation_fraction: a.validation_fraction,
            max_tokens:          a.max_tokens,
            sequence_length:     a.sequence_length,
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Trained artifact directory
    #[arg(long, env = "ENG_ARTIFACT_DIR", default_value = DEFAULT_ARTIFACT_DIR)]
    pub artifact_dir: String,

    /// Address to listen on
    #[arg(long, env = "ENG_BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    pub bind: String,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// JSON file with one project, same shape as a /predict_eng body
    #[arg(long)]
    pub input: String,

    /// Trained artifact directory
    #[arg(long, env = "ENG_ARTIFACT_DIR", default_value = DEFAULT_ARTIFACT_DIR)]
    pub artifact_dir: String,
}
