// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All business logic is delegated to Layer 2 (application).
//
//   1. `train`   — fit a model on a CSV and write an artifact
//   2. `serve`   — expose POST /predict_eng over HTTP
//   3. `predict` — one prediction from a JSON file
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, ServeArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "eng-field-predictor",
    version,
    about = "Train and serve a model that predicts a project's engineering field, discipline split and complexity."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Serve(args)   => run_serve(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting {} training on '{}'", args.variant, args.data);
    let artifact_dir = args.artifact_dir.clone();
    let summary      = TrainUseCase::new(args.into()).execute()?;

    println!("Training complete. Artifact saved to '{artifact_dir}'.");
    if let Some(test) = summary.test {
        println!(
            "Test: loss={:.4} primary_accuracy={:.1}% contributions_mse={:.3} complexity_mse={:.3} (n={})",
            test.loss,
            test.primary_accuracy * 100.0,
            test.contributions_mse,
            test.complexity_mse,
            test.samples
        );
    }
    Ok(())
}

fn run_serve(args: ServeArgs) -> Result<()> {
    use crate::application::serve_use_case::ServeUseCase;

    ServeUseCase::new(args.artifact_dir, args.bind).execute()
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let prediction = PredictUseCase::new(&args.artifact_dir)?.predict_file(&args.input)?;
    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(())
}
