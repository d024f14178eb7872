// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Model, training loop and inference.
//
//   model.rs     : input → dense(16, ReLU) → dense(16, ReLU) → dense(1)
//                   producing one logit per flight, plus the
//                   BCE-with-logits loss and accuracy helpers
//
//   trainer.rs   : Adam training loop with a per-epoch validation
//                   pass; returns a TrainingReport
//
//   inferencer.rs: rebuilds a saved model and scores new flights
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Feed-forward delay classifier
pub mod model;

/// Training loop with validation metrics
pub mod trainer;

/// Loads saved artifacts and predicts delay probabilities
pub mod inferencer;

/// Serialises tests that seed or draw from the backend's global RNG.
#[cfg(test)]
pub(crate) fn backend_rng_guard() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
