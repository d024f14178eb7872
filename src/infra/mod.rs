// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence that more than one layer uses:
//
//   checkpoint.rs: ArtifactStore holding config, feature space and
//                   model weights (gzipped MessagePack record) in one
//                   directory, so `predict` can rebuild the model.
//
//   metrics.rs   : per-epoch metrics and their CSV log.
//
// Reference: Burn Book §5 (Checkpointing)

/// Saving and loading run artifacts
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
