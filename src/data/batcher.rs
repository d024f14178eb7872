// ============================================================
// Layer 4 — Flight Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<FlightRecord>
// into tensors the model can consume.
//
// How batching works here:
//   Input:  N FlightRecords
//   Output: FlightBatch with
//             features [N, width]   (encoded, see encoder.rs)
//             labels   [N]          (0/1 DEP_DEL15)
//
// Burn's DataLoader slices a split into contiguous groups of
// `batch_size`; the last group keeps whatever is left over and is
// never dropped. With shuffling on, every call to `.iter()` draws a
// fresh permutation of the whole split, so each epoch sees a new
// order. Validation loaders are built without shuffling and yield
// the same order every epoch.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::{batcher::Batcher, DataLoader, DataLoaderBuilder},
    prelude::*,
};
use std::sync::Arc;

use crate::data::{dataset::FlightDataset, encoder::FeatureEncoder};
use crate::domain::record::FlightRecord;

// ─── FlightBatch ──────────────────────────────────────────────────────────────
/// A batch of encoded flights ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct FlightBatch<B: Backend> {
    /// Encoded features, shape [batch_size, width]
    pub features: Tensor<B, 2>,

    /// Ground truth DEP_DEL15, shape [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── FlightBatcher ────────────────────────────────────────────────────────────
/// Holds the frozen encoder and the device tensors are created on.
#[derive(Clone, Debug)]
pub struct FlightBatcher<B: Backend> {
    encoder: Arc<FeatureEncoder>,
    device:  B::Device,
}

impl<B: Backend> FlightBatcher<B> {
    pub fn new(encoder: Arc<FeatureEncoder>, device: B::Device) -> Self {
        Self { encoder, device }
    }
}

impl<B: Backend> Batcher<FlightRecord, FlightBatch<B>> for FlightBatcher<B> {
    fn batch(&self, items: Vec<FlightRecord>) -> FlightBatch<B> {
        let batch_size = items.len();
        let width      = self.encoder.width();

        // ── Flatten encoded rows into one [N * width] buffer ─────────────────
        let mut flat = Vec::with_capacity(batch_size * width);
        let mut oov  = 0usize;
        for record in &items {
            oov += self.encoder.encode_into(&record.features, &mut flat);
        }
        if oov > 0 {
            tracing::warn!("{} out-of-vocabulary field(s) encoded as zeros in a batch of {}", oov, batch_size);
        }

        let labels: Vec<i32> = items.iter().map(FlightRecord::label).collect();

        let features = Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([batch_size, width]);
        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        FlightBatch { features, labels }
    }
}

// ─── PreviewBatcher ───────────────────────────────────────────────────────────
/// Leaves records as they are. Used for the small debug pass that
/// prints what one shuffled batch of raw input looks like.
#[derive(Clone, Debug, Default)]
pub struct PreviewBatcher;

impl Batcher<FlightRecord, Vec<FlightRecord>> for PreviewBatcher {
    fn batch(&self, items: Vec<FlightRecord>) -> Vec<FlightRecord> {
        items
    }
}

// ─── Loader construction ──────────────────────────────────────────────────────

/// Shuffled loader for training. `seed` fixes the sequence of
/// per-epoch permutations; without one it is drawn from entropy.
pub fn shuffled_loader<O, T>(
    batcher:    T,
    dataset:    FlightDataset,
    batch_size: usize,
    seed:       Option<u64>,
) -> Arc<dyn DataLoader<O>>
where
    T: Batcher<FlightRecord, O> + Clone + 'static,
    O: Send + Clone + std::fmt::Debug + 'static,
{
    let seed = seed.unwrap_or_else(rand::random);
    DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .shuffle(seed)
        .build(dataset)
}

/// In-order loader for validation.
pub fn ordered_loader<O, T>(
    batcher:    T,
    dataset:    FlightDataset,
    batch_size: usize,
) -> Arc<dyn DataLoader<O>>
where
    T: Batcher<FlightRecord, O> + Clone + 'static,
    O: Send + Clone + std::fmt::Debug + 'static,
{
    DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .build(dataset)
}
