// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load CSV sources                 (Layer 4 - data)
//   Step 2: Drop incomplete rows, project    (Layer 4 - data)
//   Step 3: Parse typed flight records       (Layer 3 - domain)
//   Step 4: Freeze vocabularies + scaling    (Layer 4 - data)
//   Step 5: Split train/validation           (Layer 4 - data)
//   Step 6: Preview one small batch          (Layer 4 - data)
//   Step 7: Save config + feature space      (Layer 6 - infra, opt-in)
//   Step 8: Run training loop                (Layer 5 - ml)
//
// Step 4 runs on the FULL cleaned record list, before the split,
// so every category seen anywhere in the data has a slot.
//
// Reference: Burn Book §5 (Training)

use anyhow::{ensure, Context, Result};
use burn::data::dataloader::batcher::Batcher;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::{
    batcher::PreviewBatcher,
    cleaner::{CleanReport, Cleaner},
    dataset::FlightDataset,
    encoder::{DistanceScaling, FeatureEncoder},
    loader::CsvLoader,
    splitter::{rng_for, split_train_val},
    vocabulary::FieldVocabularies,
};
use crate::domain::{
    record::{FlightRecord, DEFAULT_RETAINED_COLUMNS},
    traits::TableSource,
};
use crate::infra::checkpoint::ArtifactStore;
use crate::ml::trainer::{run_training, TrainingReport};

// ─── Training Configuration ──────────────────────────────────────────────────
// All knobs for a training run.
// Serialisable so it can be written next to the model and reloaded
// by `predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub sources:              Vec<String>,
    pub retained_columns:     Vec<String>,
    pub drop_artifact_column: bool,
    pub val_fraction:         f64,
    pub batch_size:           usize,
    /// Size of the debug preview batch; 0 skips the preview
    pub preview_batch_size:   usize,
    pub epochs:               usize,
    pub seed:                 Option<u64>,
    pub learning_rate:        f64,
    pub hidden_size:          usize,
    pub normalize_distance:   bool,
    pub artifacts_dir:        Option<String>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            sources:              Vec::new(),
            retained_columns:     DEFAULT_RETAINED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            drop_artifact_column: true,
            val_fraction:         0.2,
            batch_size:           32,
            preview_batch_size:   5,
            epochs:               5,
            seed:                 None,
            learning_rate:        1e-3,
            hidden_size:          16,
            normalize_distance:   false,
            artifacts_dir:        None,
        }
    }
}

impl TrainConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.sources.is_empty(), "at least one source is required");
        ensure!(
            (0.0..1.0).contains(&self.val_fraction),
            "val_fraction must be in [0, 1), got {}",
            self.val_fraction
        );
        ensure!(self.batch_size > 0, "batch_size must be at least 1");
        ensure!(self.hidden_size > 0, "hidden_size must be at least 1");
        ensure!(
            self.learning_rate.is_finite() && self.learning_rate > 0.0,
            "learning_rate must be positive, got {}",
            self.learning_rate
        );
        Ok(())
    }
}

/// What one run produced, for the CLI and for tests.
#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub clean:     CleanReport,
    pub train_len: usize,
    pub val_len:   usize,
    pub encoder:   Arc<FeatureEncoder>,
    pub report:    TrainingReport,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainSummary> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Load every source into one table ──────────────────────────
        let loader = CsvLoader::new(cfg.sources.clone())
            .with_drop_artifact_column(cfg.drop_artifact_column);
        self.run(&loader)
    }

    /// Steps 2..8 on an already-resolved table source.
    pub fn run(&self, source: &dyn TableSource) -> Result<TrainSummary> {
        let cfg   = &self.config;
        let table = source.load_table().context("Failed to load flight data")?;

        // ── Step 2: Drop rows with missing fields, keep retained columns ──────
        let cleaner = Cleaner::new(cfg.retained_columns.clone());
        let (table, clean) = cleaner.clean(table)?;

        // ── Step 3: Typed records ─────────────────────────────────────────────
        let records = FlightRecord::from_table(&table)?;

        // ── Step 4: Frozen feature space over the full dataset ────────────────
        let vocabularies = FieldVocabularies::build(records.iter().map(|r| &r.features));
        let scaling = if cfg.normalize_distance {
            DistanceScaling::standardize(records.iter().map(|r| &r.features))
        } else {
            DistanceScaling::Raw
        };
        let encoder = Arc::new(FeatureEncoder::new(vocabularies, scaling));

        // ── Step 5: Train / validation split ──────────────────────────────────
        let (train_records, val_records) = split_train_val(records, cfg.val_fraction, cfg.seed);
        let train = FlightDataset::new(train_records);
        let valid = FlightDataset::new(val_records);
        tracing::info!(
            "Delayed share: train={:.3}, validation={:.3}",
            train.delayed_ratio(),
            valid.delayed_ratio()
        );
        let (train_len, val_len) = (train.records().len(), valid.records().len());

        // ── Step 6: Look at one small shuffled batch ──────────────────────────
        if cfg.preview_batch_size > 0 {
            preview_batch(&encoder, &train, cfg.preview_batch_size, cfg.seed);
        }

        // ── Step 7: Persist config + feature space (opt-in) ───────────────────
        let store = cfg.artifacts_dir.as_deref().map(ArtifactStore::new).transpose()?;
        if let Some(store) = &store {
            store.save_config(cfg)?;
            store.save_encoder(&encoder)?;
        }

        // ── Step 8: Run training loop (Layer 5) ───────────────────────────────
        let report = run_training(cfg, train, valid, encoder.clone(), store.as_ref())?;
        if let Some(store) = &store {
            tracing::info!(
                "Artifacts written to '{}' (metrics: '{}')",
                store.dir().display(),
                store.metrics_path().display()
            );
        }

        Ok(TrainSummary { clean, train_len, val_len, encoder, report })
    }
}

/// Draw up to `batch_size` distinct training records in random order.
/// Only the drawn records are cloned.
fn preview_records(train: &[FlightRecord], batch_size: usize, seed: Option<u64>) -> Vec<FlightRecord> {
    let amount = batch_size.min(train.len());
    let picked = rand::seq::index::sample(&mut rng_for(seed), train.len(), amount);
    PreviewBatcher.batch(picked.iter().map(|i| train[i].clone()).collect())
}

/// Log feature names, ORIGIN values and labels of one shuffled batch.
fn preview_batch(encoder: &FeatureEncoder, train: &FlightDataset, batch_size: usize, seed: Option<u64>) {
    let batch = preview_records(train.records(), batch_size, seed);
    if batch.is_empty() {
        tracing::info!("Preview skipped: training split is empty");
        return;
    }

    let origins: Vec<&str> = batch.iter().map(|r| r.features.origin.as_str()).collect();
    let labels:  Vec<i32>  = batch.iter().map(FlightRecord::label).collect();
    tracing::info!("Every feature: {:?}", encoder.feature_names());
    tracing::info!("A batch of origins: {:?}", origins);
    tracing::info!("A batch of targets: {:?}", labels);
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::CategoricalField;
    use std::io::Write;

    // 10 rows, 2 with a missing field, 3 distinct origins, trailing
    // artifact column as in the raw exports.
    const TEN_ROWS: &str = "\
DAY_OF_MONTH,DAY_OF_WEEK,OP_CARRIER,ORIGIN,DEST,DEP_TIME,DEP_DEL15,DEP_TIME_BLK,DISTANCE,
1,2,AA,ORD,LAX,0601,0,0600-0659,1744.0,
1,2,UA,LAX,ORD,1805,1,1800-1859,1744.0,
2,3,AA,JFK,ORD,0612,0,0600-0659,740.0,
2,3,UA,ORD,JFK,,0,0600-0659,740.0,
3,4,UA,LAX,JFK,1830,1,1800-1859,2475.0,
3,4,AA,ORD,LAX,0615,0,0600-0659,1744.0,
4,5,UA,JFK,LAX,1820,1,1800-1859,2475.0,
4,5,UA,ORD,LAX,0633,,0600-0659,1744.0,
5,6,AA,LAX,ORD,0645,0,0600-0659,1744.0,
6,7,AA,JFK,ORD,1850,1,1800-1859,100.0,
";

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn config(source: String) -> TrainConfig {
        TrainConfig {
            sources:      vec![source],
            val_fraction: 0.25,
            epochs:       1,
            seed:         Some(42),
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_end_to_end_small_file() {
        let _rng = crate::ml::backend_rng_guard();
        let dir     = tempfile::tempdir().unwrap();
        let source  = write_csv(&dir, "jan.csv", TEN_ROWS);
        let summary = TrainUseCase::new(config(source)).execute().unwrap();

        assert_eq!(summary.clean.rows_before, 10);
        assert_eq!(summary.clean.rows_after, 8);
        assert_eq!((summary.train_len, summary.val_len), (6, 2));
        assert_eq!(summary.encoder.vocabularies().get(CategoricalField::Origin).len(), 3);

        let epochs = &summary.report.epochs;
        assert_eq!(epochs.len(), 1);
        let m = &epochs[0];
        assert!(m.train_loss.is_finite());
        assert!(m.val_loss.is_finite());
        assert!((0.0..=1.0).contains(&m.train_accuracy));
        assert!((0.0..=1.0).contains(&m.val_accuracy));
    }

    #[test]
    fn test_vocabulary_covers_validation_only_values() {
        let _rng = crate::ml::backend_rng_guard();
        let dir     = tempfile::tempdir().unwrap();
        let source  = write_csv(&dir, "jan.csv", TEN_ROWS);
        let summary = TrainUseCase::new(config(source)).execute().unwrap();

        // Built before the split: every clean value has a slot.
        let vocabs   = summary.encoder.vocabularies();
        let carriers = vocabs.get(CategoricalField::Carrier);
        assert_eq!(carriers.len(), 2);
        assert_eq!(vocabs.get(CategoricalField::DepTimeBlock).len(), 2);
        for c in ["AA", "UA"] {
            assert!(carriers.contains(c));
        }
    }

    #[test]
    fn test_artifacts_written_when_configured() {
        let _rng = crate::ml::backend_rng_guard();
        let dir    = tempfile::tempdir().unwrap();
        let source = write_csv(&dir, "jan.csv", TEN_ROWS);
        let out    = dir.path().join("run");
        let cfg    = TrainConfig {
            artifacts_dir: Some(out.to_string_lossy().into_owned()),
            epochs:        2,
            ..config(source)
        };
        TrainUseCase::new(cfg.clone()).execute().unwrap();

        for file in ["train_config.json", "feature_space.json", "model.mpk.gz", "metrics.csv"] {
            assert!(out.join(file).exists(), "missing {file}");
        }
        let store = ArtifactStore::new(&out).unwrap();
        assert_eq!(store.load_config().unwrap(), cfg);
        let metrics = std::fs::read_to_string(store.metrics_path()).unwrap();
        assert_eq!(metrics.lines().count(), 3);
    }

    #[test]
    fn test_missing_retained_column_is_schema_error() {
        let dir    = tempfile::tempdir().unwrap();
        let source = write_csv(&dir, "jan.csv", TEN_ROWS);
        let mut cfg = config(source);
        cfg.retained_columns.push("TAIL_NUM".to_string());

        let err = TrainUseCase::new(cfg).execute().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::domain::error::PipelineError>(),
            Some(crate::domain::error::PipelineError::Schema(_))
        ));
    }

    #[test]
    fn test_preview_draws_a_small_distinct_sample() {
        let dir     = tempfile::tempdir().unwrap();
        let source  = write_csv(&dir, "jan.csv", TEN_ROWS);
        let table   = CsvLoader::new(vec![source]).load_table().unwrap();
        let (table, _) = Cleaner::new(TrainConfig::default().retained_columns).clean(table).unwrap();
        let records = FlightRecord::from_table(&table).unwrap();

        let batch = preview_records(&records, 5, Some(7));
        assert_eq!(batch.len(), 5);
        for r in &batch {
            assert!(records.contains(r));
        }
        let distinct: std::collections::HashSet<String> =
            batch.iter().map(|r| format!("{:?}", r)).collect();
        assert_eq!(distinct.len(), 5);
        assert_eq!(preview_records(&records, 5, Some(7)), batch);

        // capped at the split size
        assert_eq!(preview_records(&records, 32, Some(7)).len(), records.len());
        assert!(preview_records(&[], 5, Some(7)).is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = TrainConfig { val_fraction: 1.0, ..config("x.csv".into()) };
        assert!(bad.validate().is_err());
        let none = TrainConfig::default();
        assert!(none.validate().is_err());
        assert!(config("x.csv".into()).validate().is_ok());
    }
}
