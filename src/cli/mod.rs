// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All work is delegated to Layer 2 (application).
//
//   1. `train`  : load, clean, split, encode and fit the classifier
//   2. `predict`: score new CSV rows with saved artifacts
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "flight-delay",
    version,
    about = "Predict whether a flight departs 15+ minutes late from schedule data."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. Routes only, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on {} source(s)", args.sources.len());

    let summary = TrainUseCase::new(args.into()).execute()?;

    match summary.report.last() {
        Some(m) => println!(
            "Training complete: {} train / {} validation rows, final val_loss={:.4}, val_accuracy={:.4}",
            summary.train_len, summary.val_len, m.val_loss, m.val_accuracy
        ),
        None => println!("Training complete: no epochs run."),
    }
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case = PredictUseCase::new(&args.artifacts_dir)?;
    let stdout   = std::io::stdout();
    let summary  = use_case.execute(args.sources, stdout.lock())?;

    tracing::info!(
        "Prediction complete: {} scored, {} dropped for missing fields",
        summary.rows_scored,
        summary.rows_dropped
    );
    Ok(())
}
