// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Manual train + validation loop using Burn's DataLoader and Adam.
//
//   Initialized → EpochInProgress(1) → EpochComplete(1) → ...
//               → EpochComplete(N) → TrainingComplete
//
// Per epoch:
//   - every training batch: forward, BCE-with-logits loss,
//     backward, Adam step
//   - then every validation batch: forward only on model.valid()
//     (inner backend, no autodiff graph), loss + accuracy
//
// No early stopping and no mid-run checkpoints: a run either
// finishes all epochs or is killed.
//
// Key Burn insight:
//   - Training uses Autodiff<B> for gradients
//   - model.valid() returns the model on the inner backend
//   - Validation batcher must also use the inner backend

use anyhow::{ensure, Result};
use burn::{
    data::dataloader::DataLoader,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::sync::Arc;

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{ordered_loader, shuffled_loader, FlightBatch, FlightBatcher},
    dataset::FlightDataset,
    encoder::FeatureEncoder,
};
use crate::infra::{checkpoint::ArtifactStore, metrics::EpochMetrics};
use crate::ml::model::{count_correct, DelayClassifier, DelayClassifierConfig};

pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingPhase {
    Initialized,
    EpochInProgress(usize),
    EpochComplete(usize),
    TrainingComplete,
}

/// What a finished run hands back to the caller.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub epochs: Vec<EpochMetrics>,
    pub phase:  TrainingPhase,
}

impl TrainingReport {
    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }
}

/// Sample-weighted loss and accuracy over one pass.
#[derive(Debug, Default)]
struct RunningMetrics {
    loss_sum: f64,
    correct:  usize,
    samples:  usize,
}

impl RunningMetrics {
    fn add(&mut self, batch_loss: f64, correct: usize, batch_len: usize) {
        self.loss_sum += batch_loss * batch_len as f64;
        self.correct  += correct;
        self.samples  += batch_len;
    }

    fn loss(&self) -> f64 {
        if self.samples > 0 { self.loss_sum / self.samples as f64 } else { f64::NAN }
    }

    fn accuracy(&self) -> f64 {
        if self.samples > 0 { self.correct as f64 / self.samples as f64 } else { 0.0 }
    }
}

/// Train on the CPU NdArray backend.
pub fn run_training(
    cfg:       &TrainConfig,
    train:     FlightDataset,
    valid:     FlightDataset,
    encoder:   Arc<FeatureEncoder>,
    artifacts: Option<&ArtifactStore>,
) -> Result<TrainingReport> {
    let device = burn::backend::ndarray::NdArrayDevice::default();
    tracing::info!("Using NdArray device: {:?}", device);

    let (model, report) = train_loop::<TrainBackend>(cfg, train, valid, encoder, device)?;

    if let Some(store) = artifacts {
        store.save_model(&model)?;
        for m in &report.epochs {
            store.log_metrics(m)?;
        }
    }
    Ok(report)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:     &TrainConfig,
    train:   FlightDataset,
    valid:   FlightDataset,
    encoder: Arc<FeatureEncoder>,
    device:  B::Device,
) -> Result<(DelayClassifier<B>, TrainingReport)> {
    ensure!(cfg.batch_size > 0, "batch size must be at least 1");

    // ── Build model ───────────────────────────────────────────────────────────
    if let Some(seed) = cfg.seed {
        B::seed(seed);
    }
    let model_cfg = DelayClassifierConfig::new(encoder.width()).with_hidden_size(cfg.hidden_size);
    let mut model: DelayClassifier<B> = model_cfg.init(&device);
    let mut phase = TrainingPhase::Initialized;
    tracing::info!(
        "Model ready: {} → {} → {} → 1 ({} parameters)",
        model_cfg.input_size,
        model_cfg.hidden_size,
        model_cfg.hidden_size,
        model.num_params()
    );

    // ── Adam optimiser (default betas / epsilon) ──────────────────────────────
    let mut optim = AdamConfig::new().init::<B, DelayClassifier<B>>();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader: Arc<dyn DataLoader<FlightBatch<B>>> = shuffled_loader(
        FlightBatcher::<B>::new(encoder.clone(), device.clone()),
        train,
        cfg.batch_size,
        cfg.seed,
    );
    let valid_loader: Arc<dyn DataLoader<FlightBatch<B::InnerBackend>>> = ordered_loader(
        FlightBatcher::<B::InnerBackend>::new(encoder, device.clone()),
        valid,
        cfg.batch_size,
    );

    // ── Epoch loop ────────────────────────────────────────────────────────────
    let mut history = Vec::with_capacity(cfg.epochs);
    for epoch in 1..=cfg.epochs {
        phase = TrainingPhase::EpochInProgress(epoch);
        tracing::debug!("{:?}", phase);

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_metrics = RunningMetrics::default();
        for batch in train_loader.iter() {
            let batch_len = batch.labels.dims()[0];
            let (loss, logits) = model.forward_loss(batch.features, batch.labels.clone());

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            let correct       = count_correct(logits.detach(), batch.labels);
            train_metrics.add(loss_val, correct, batch_len);

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        // ── Validation phase ──────────────────────────────────────────────────
        let valid_metrics = evaluate(&model.valid(), valid_loader.as_ref());

        let metrics = EpochMetrics::new(
            epoch,
            train_metrics.loss(),
            train_metrics.accuracy(),
            valid_metrics.loss(),
            valid_metrics.accuracy(),
        );
        println!("Epoch {:>3}/{} | {}", epoch, cfg.epochs, metrics);
        tracing::info!(
            epoch,
            train_loss = metrics.train_loss,
            val_loss = metrics.val_loss,
            val_accuracy = metrics.val_accuracy,
            "epoch complete"
        );
        history.push(metrics);

        phase = TrainingPhase::EpochComplete(epoch);
    }

    tracing::debug!("{:?} → {:?}", phase, TrainingPhase::TrainingComplete);
    phase = TrainingPhase::TrainingComplete;
    tracing::info!("Training complete after {} epoch(s)", history.len());

    Ok((model, TrainingReport { epochs: history, phase }))
}

/// Forward-only pass over a loader; no weights change.
fn evaluate<B: Backend>(
    model:  &DelayClassifier<B>,
    loader: &dyn DataLoader<FlightBatch<B>>,
) -> RunningMetrics {
    let mut metrics = RunningMetrics::default();
    for batch in loader.iter() {
        let batch_len = batch.labels.dims()[0];
        let logits    = model.forward(batch.features);
        let loss: f64 = model
            .loss(logits.clone(), batch.labels.clone())
            .into_scalar()
            .elem::<f64>();
        metrics.add(loss, count_correct(logits, batch.labels), batch_len);
    }
    metrics
}
