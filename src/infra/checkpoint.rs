// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Persists everything a finished run needs to be replayed on new
// data, all inside one directory:
//
//   <artifacts_dir>/
//     train_config.json    ← the run's TrainConfig
//     feature_space.json   ← frozen vocabularies + distance scaling
//     model.mpk.gz         ← final weights (gzipped MessagePack)
//     metrics.csv          ← one row per epoch
//
// The encoder has to be saved next to the weights. The one-hot
// positions are only meaningful with the exact vocabularies the
// model was trained on, and hidden_size from the config is what
// rebuilds the same architecture before loading the record.
//
// Weights go through Burn's NamedMpkGzFileRecorder at half precision:
//   - Serialises model parameters to MessagePack format
//   - Compresses with gzip (CompactRecorder alone writes plain .mpk)
//   - Loading fails if the architecture doesn't match
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{HalfPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::data::encoder::FeatureEncoder;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::DelayClassifier;

const CONFIG_FILE:        &str = "train_config.json";
const FEATURE_SPACE_FILE: &str = "feature_space.json";
// the recorder appends .mpk.gz
const MODEL_FILE:         &str = "model";

type WeightRecorder = NamedMpkGzFileRecorder<HalfPrecisionSettings>;

pub struct ArtifactStore {
    dir:     PathBuf,
    metrics: MetricsLogger,
}

impl ArtifactStore {
    /// Open (creating if needed) an artifact directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create artifact directory '{}'", dir.display()))?;
        let metrics = MetricsLogger::new(&dir)?;
        Ok(Self { dir, metrics })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json(CONFIG_FILE, cfg)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read_json(CONFIG_FILE)
    }

    pub fn save_encoder(&self, encoder: &FeatureEncoder) -> Result<()> {
        self.write_json(FEATURE_SPACE_FILE, encoder)
    }

    pub fn load_encoder(&self) -> Result<FeatureEncoder> {
        self.read_json(FEATURE_SPACE_FILE)
    }

    /// Save the final model weights.
    pub fn save_model<B: Backend>(&self, model: &DelayClassifier<B>) -> Result<()> {
        let path = self.dir.join(MODEL_FILE);
        WeightRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save model to '{}'", path.display()))?;

        tracing::info!("Saved model weights to '{}.mpk.gz'", path.display());
        Ok(())
    }

    /// Load saved weights into a freshly built model of the same shape.
    pub fn load_model<B: Backend>(
        &self,
        model:  DelayClassifier<B>,
        device: &B::Device,
    ) -> Result<DelayClassifier<B>> {
        let path = self.dir.join(MODEL_FILE);
        let record = WeightRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load model '{}.mpk.gz'. Has 'train --artifacts-dir' been run?",
                    path.display()
                )
            })?;
        Ok(model.load_record(record))
    }

    pub fn log_metrics(&self, m: &EpochMetrics) -> Result<()> {
        self.metrics.log(m)
    }

    pub fn metrics_path(&self) -> &Path {
        self.metrics.csv_path()
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed '{}'", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{encoder::DistanceScaling, vocabulary::FieldVocabularies};
    use crate::domain::record::{CategoricalField, FlightFeatures};
    use crate::ml::model::DelayClassifierConfig;

    type TestBackend = burn::backend::NdArray;

    fn encoder() -> FeatureEncoder {
        let rows = vec![
            FlightFeatures {
                day_of_week:  "1".into(),
                carrier:      "AA".into(),
                origin:       "ORD".into(),
                dep_time_blk: "0600-0659".into(),
                distance:     733.0,
            },
            FlightFeatures {
                day_of_week:  "2".into(),
                carrier:      "UA".into(),
                origin:       "LAX".into(),
                dep_time_blk: "1800-1859".into(),
                distance:     2475.0,
            },
        ];
        FeatureEncoder::new(FieldVocabularies::build(&rows), DistanceScaling::standardize(&rows))
    }

    #[test]
    fn test_config_and_encoder_round_trip() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();

        let cfg = TrainConfig { epochs: 7, seed: Some(11), ..TrainConfig::default() };
        store.save_config(&cfg).unwrap();
        let loaded = store.load_config().unwrap();
        assert_eq!(loaded.epochs, 7);
        assert_eq!(loaded.seed, Some(11));

        let enc = encoder();
        store.save_encoder(&enc).unwrap();
        let back = store.load_encoder().unwrap();
        assert_eq!(back, enc);
        assert_eq!(back.encode_field(CategoricalField::Origin, "LAX"), vec![0.0, 1.0]);
    }

    #[test]
    fn test_model_round_trip_preserves_outputs() {
        let _rng = crate::ml::backend_rng_guard();
        let dir    = tempfile::tempdir().unwrap();
        let store  = ArtifactStore::new(dir.path()).unwrap();
        let device = Default::default();
        let cfg    = DelayClassifierConfig::new(5);

        let model: DelayClassifier<TestBackend> = cfg.init(&device);
        store.save_model(&model).unwrap();
        assert!(dir.path().join("model.mpk.gz").exists());
        assert!(!dir.path().join("model.mpk").exists());

        let fresh: DelayClassifier<TestBackend> = cfg.init(&device);
        let loaded = store.load_model(fresh, &device).unwrap();

        let x = Tensor::<TestBackend, 2>::ones([2, 5], &device);
        let a: Vec<f32> = model.forward(x.clone()).into_data().iter::<f32>().collect();
        let b: Vec<f32> = loaded.forward(x).into_data().iter::<f32>().collect();
        // weights are stored at half precision
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-2, "{x} vs {y}");
        }
    }

    #[test]
    fn test_missing_artifacts_are_errors() {
        let _rng = crate::ml::backend_rng_guard();
        let dir   = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        assert!(store.load_config().is_err());
        assert!(store.load_encoder().is_err());

        let device = Default::default();
        let fresh: DelayClassifier<TestBackend> = DelayClassifierConfig::new(3).init(&device);
        assert!(store.load_model(fresh, &device).is_err());
    }
}
