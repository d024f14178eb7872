// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to data sources through this trait,
// so tests can feed an in-memory table and the CLI can feed CSV
// files or URLs without the use cases knowing the difference.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::table::Table;

// ─── TableSource ──────────────────────────────────────────────────────────────
/// Any component that can produce one concatenated table.
///
/// Implementations:
///   - CsvLoader → one or more CSV files / http(s) URIs
///   - Table     → itself (already in memory)
pub trait TableSource {
    /// Load every row from this source.
    fn load_table(&self) -> Result<Table>;
}

impl TableSource for Table {
    fn load_table(&self) -> Result<Table> {
        Ok(self.clone())
    }
}
