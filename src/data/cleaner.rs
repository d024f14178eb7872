// ============================================================
// Layer 4 — Cleaner
// ============================================================
// Two steps, applied in this order:
//
//   1. Drop every row with at least one missing field
//      (across ALL loaded columns, not just the retained ones)
//   2. Project the table down to the retained column list
//
// Missing rows are dropped, never imputed. On the January 2019/2020
// exports this loses well under 3% of rows.
//
// A retained column that is absent from the source is a
// SchemaError, checked before any row is touched.

use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineError;
use crate::domain::table::Table;

/// Row counts before and after cleaning, for the run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanReport {
    pub rows_before: usize,
    pub rows_after:  usize,
}

impl CleanReport {
    pub fn rows_dropped(&self) -> usize {
        self.rows_before - self.rows_after
    }
}

pub struct Cleaner {
    retained: Vec<String>,
}

impl Cleaner {
    pub fn new(retained: Vec<String>) -> Self {
        Self { retained }
    }

    pub fn retained_columns(&self) -> &[String] {
        &self.retained
    }

    /// Drop incomplete rows, then project to the retained columns.
    pub fn clean(&self, mut table: Table) -> Result<(Table, CleanReport), PipelineError> {
        for column in &self.retained {
            table.require_column(column)?;
        }

        let rows_before = table.len();
        let dropped     = table.retain_rows(|row| row.iter().all(Option::is_some));
        let projected   = table.project(&self.retained)?;

        let report = CleanReport { rows_before, rows_after: projected.len() };
        debug_assert_eq!(report.rows_dropped(), dropped);

        tracing::info!(
            "Cleaned: {} rows → {} rows ({} dropped for missing fields), {} columns kept",
            report.rows_before,
            report.rows_after,
            report.rows_dropped(),
            projected.width()
        );
        Ok((projected, report))
    }
}
