// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds a trained DelayClassifier from an artifact directory and
// scores new flights with it. Encoding goes through the saved
// feature space, so unseen categories still map to zero blocks.
use anyhow::Result;
use burn::prelude::*;
use std::sync::Arc;

use crate::data::encoder::FeatureEncoder;
use crate::domain::record::FlightFeatures;
use crate::infra::checkpoint::ArtifactStore;
use crate::ml::model::{probabilities, DelayClassifier, DelayClassifierConfig};

type InferBackend = burn::backend::NdArray;

const SCORING_BATCH: usize = 1024;

pub struct Inferencer {
    model:   DelayClassifier<InferBackend>,
    encoder: Arc<FeatureEncoder>,
    device:  burn::backend::ndarray::NdArrayDevice,
}

impl Inferencer {
    pub fn from_artifacts(store: &ArtifactStore) -> Result<Self> {
        let device  = burn::backend::ndarray::NdArrayDevice::default();
        let cfg     = store.load_config()?;
        let encoder = Arc::new(store.load_encoder()?);

        let model_cfg = DelayClassifierConfig::new(encoder.width()).with_hidden_size(cfg.hidden_size);
        let model: DelayClassifier<InferBackend> = model_cfg.init(&device);
        let model = store.load_model(model, &device)?;
        tracing::info!(
            "Model loaded from '{}' (input width {})",
            store.dir().display(),
            encoder.width()
        );
        Ok(Self { model, encoder, device })
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    /// Delay probability for each flight, in input order.
    pub fn predict(&self, flights: &[FlightFeatures]) -> Vec<f32> {
        let width   = self.encoder.width();
        let mut out = Vec::with_capacity(flights.len());
        let mut oov = 0usize;

        for chunk in flights.chunks(SCORING_BATCH) {
            let mut flat = Vec::with_capacity(chunk.len() * width);
            for f in chunk {
                oov += self.encoder.encode_into(f, &mut flat);
            }
            let features = Tensor::<InferBackend, 1>::from_floats(flat.as_slice(), &self.device)
                .reshape([chunk.len(), width]);
            out.extend(probabilities(self.model.forward(features)));
        }

        if oov > 0 {
            tracing::warn!("{} out-of-vocabulary field(s) encoded as zeros", oov);
        }
        out
    }
}
