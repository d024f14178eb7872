// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `predict`, and all
// their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;
use crate::domain::record::DEFAULT_RETAINED_COLUMNS;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the delay classifier on one or more CSV exports
    Train(TrainArgs),

    /// Score flights with a model saved by `train --artifacts-dir`
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV sources: local paths or http(s) URIs, concatenated in order
    #[arg(required = true, num_args = 1..)]
    pub sources: Vec<String>,

    /// Columns kept after cleaning (comma separated)
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_RETAINED_COLUMNS.map(String::from))]
    pub retained_columns: Vec<String>,

    /// Keep a trailing blank/"Unnamed: N" column instead of dropping it
    #[arg(long)]
    pub keep_artifact_column: bool,

    /// Fraction of the cleaned rows held out for validation
    #[arg(long, default_value_t = 0.2)]
    pub val_fraction: f64,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Size of the batch logged before training; 0 skips it
    #[arg(long, default_value_t = 5)]
    pub preview_batch_size: usize,

    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    /// Fixes the split, the shuffles and the initial weights
    #[arg(long)]
    pub seed: Option<u64>,

    /// Adam step size
    #[arg(long, default_value_t = 1e-3)]
    pub learning_rate: f64,

    /// Width of both hidden layers
    #[arg(long, default_value_t = 16)]
    pub hidden_size: usize,

    /// Standardize DISTANCE instead of feeding raw miles
    #[arg(long)]
    pub normalize_distance: bool,

    /// Write config, feature space, weights and metrics here
    #[arg(long)]
    pub artifacts_dir: Option<String>,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            sources:              a.sources,
            retained_columns:     a.retained_columns,
            drop_artifact_column: !a.keep_artifact_column,
            val_fraction:         a.val_fraction,
            batch_size:           a.batch_size,
            preview_batch_size:   a.preview_batch_size,
            epochs:               a.epochs,
            seed:                 a.seed,
            learning_rate:        a.learning_rate,
            hidden_size:          a.hidden_size,
            normalize_distance:   a.normalize_distance,
            artifacts_dir:        a.artifacts_dir,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// CSV sources to score; DEP_DEL15 is optional
    #[arg(required = true, num_args = 1..)]
    pub sources: Vec<String>,

    /// Directory written by `train --artifacts-dir`
    #[arg(long)]
    pub artifacts_dir: String,
}
