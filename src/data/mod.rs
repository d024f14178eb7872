// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw CSV exports to tensor batches.
//
//   CSV sources (paths / URIs)
//       │
//       ▼
//   CsvLoader         → reads + concatenates, drops artifact column
//       │
//       ▼
//   Cleaner           → drops incomplete rows, keeps retained columns
//       │
//       ▼
//   FieldVocabularies → frozen per-field category lists (full data)
//       │
//       ▼
//   split_train_val   → shuffled train / validation partition
//       │
//       ▼
//   FlightDataset     → implements Burn's Dataset trait
//       │
//       ▼
//   FlightBatcher     → encodes records into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads CSV files or http(s) URIs into one Table
pub mod loader;

/// Missing-value row filter and column projection
pub mod cleaner;

/// Shuffles and splits data into train/validation sets
pub mod splitter;

/// Per-field category vocabularies
pub mod vocabulary;

/// One-hot + distance feature encoding
pub mod encoder;

/// Implements Burn's Dataset trait for flight records
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
