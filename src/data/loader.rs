// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Reads one or more CSV sources and concatenates them into a
// single Table.
//
// A source is either a local path or an http(s):// URI. Remote
// sources are fetched with a blocking HTTP client and parsed as
// they stream in; nothing is cached on disk.
//
// Artifact column policy:
//   The on-time exports end every line with a trailing comma, which
//   shows up as one extra column with a blank header (pandas calls
//   it "Unnamed: 21"). When `drop_artifact_column` is on, the LAST
//   column is dropped if and only if its header is blank or of the
//   form "Unnamed: N". No other column is ever dropped here.
//
// Failure modes:
//   - unreadable file / unreachable URI     → PipelineError::Io
//   - ragged row, mismatched column sets    → PipelineError::Schema
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Result};
use csv::{ErrorKind, ReaderBuilder};
use std::{fs::File, io::Read};

use crate::domain::error::PipelineError;
use crate::domain::table::{parse_cell, Table};
use crate::domain::traits::TableSource;

/// Loads and concatenates CSV sources.
/// Implements the TableSource trait from Layer 3.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    /// Paths or http(s) URIs, read in order
    sources:              Vec<String>,
    /// Drop the trailing unnamed column (see module header)
    drop_artifact_column: bool,
}

impl CsvLoader {
    pub fn new(sources: Vec<String>) -> Self {
        Self { sources, drop_artifact_column: true }
    }

    pub fn with_drop_artifact_column(mut self, drop: bool) -> Self {
        self.drop_artifact_column = drop;
        self
    }

    /// Read and parse one source, applying the artifact column policy.
    fn load_source(&self, location: &str) -> Result<Table, PipelineError> {
        let reader    = open_source(location)?;
        let mut table = parse_csv(location, reader)?;

        if self.drop_artifact_column {
            match table.headers().last() {
                Some(h) if is_artifact_header(h) => {
                    let last    = table.width() - 1;
                    let dropped = table.drop_column(last);
                    tracing::debug!("Dropped artifact column '{}' from '{}'", dropped, location);
                }
                _ => tracing::warn!(
                    "No trailing artifact column in '{}', nothing dropped",
                    location
                ),
            }
        }

        tracing::info!(
            "Loaded {} rows x {} columns from '{}'",
            table.len(),
            table.width(),
            location
        );
        Ok(table)
    }
}

impl TableSource for CsvLoader {
    fn load_table(&self) -> Result<Table> {
        let Some((first, rest)) = self.sources.split_first() else {
            bail!("no CSV sources given");
        };

        let mut table = self.load_source(first)?;
        for location in rest {
            table.append(self.load_source(location)?)?;
        }

        tracing::info!(
            "Concatenated {} source(s): {} rows total",
            self.sources.len(),
            table.len()
        );
        Ok(table)
    }
}

fn is_artifact_header(header: &str) -> bool {
    let h = header.trim();
    h.is_empty() || h.starts_with("Unnamed:")
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn open_source(location: &str) -> Result<Box<dyn Read>, PipelineError> {
    if is_remote(location) {
        let response = reqwest::blocking::get(location)
            .and_then(|r| r.error_for_status())
            .map_err(|e| PipelineError::io(location, e))?;
        Ok(Box::new(response))
    } else {
        let file = File::open(location).map_err(|e| PipelineError::io(location, e))?;
        Ok(Box::new(file))
    }
}

/// Parse CSV text with a header row into a Table.
fn parse_csv<R: Read>(location: &str, reader: R) -> Result<Table, PipelineError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| csv_error(location, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| csv_error(location, e))?;
        rows.push(record.iter().map(parse_cell).collect());
    }

    Table::new(headers, rows)
}

fn csv_error(location: &str, err: csv::Error) -> PipelineError {
    if let ErrorKind::UnequalLengths { pos, expected_len, len } = err.kind() {
        return PipelineError::schema(format!(
            "'{}' line {}: expected {} fields, found {}",
            location,
            pos.as_ref().map(|p| p.line()).unwrap_or_default(),
            expected_len,
            len
        ));
    }
    PipelineError::io(location, err)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper to write CSV text to a temp file.
    fn write_csv(text: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(text.as_bytes()).unwrap();
        f
    }

    fn path(f: &NamedTempFile) -> String {
        f.path().to_string_lossy().into_owned()
    }

    #[test]
    fn test_drops_trailing_artifact_column() {
        let f = write_csv("ORIGIN,DISTANCE,\nORD,733,\nLAX,,\n");
        let t = CsvLoader::new(vec![path(&f)]).load_table().unwrap();
        assert_eq!(t.headers(), &["ORIGIN".to_string(), "DISTANCE".to_string()]);
        assert_eq!(t.len(), 2);
        // The empty DISTANCE on row 2 is a missing field, not an error
        assert_eq!(t.rows()[1][1], None);
    }

    #[test]
    fn test_keeps_trailing_column_when_disabled() {
        let f = write_csv("ORIGIN,DISTANCE,\nORD,733,\n");
        let t = CsvLoader::new(vec![path(&f)])
            .with_drop_artifact_column(false)
            .load_table()
            .unwrap();
        assert_eq!(t.width(), 3);
    }

    #[test]
    fn test_named_last_column_is_never_dropped() {
        let f = write_csv("ORIGIN,DISTANCE\nORD,733\n");
        let t = CsvLoader::new(vec![path(&f)]).load_table().unwrap();
        assert_eq!(t.width(), 2);
    }

    #[test]
    fn test_concatenates_sources() {
        let a = write_csv("ORIGIN,DISTANCE,\nORD,733,\n");
        let b = write_csv("DISTANCE,ORIGIN,Unnamed: 2\n2475,JFK,\n100,LAX,\n");
        let t = CsvLoader::new(vec![path(&a), path(&b)]).load_table().unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.rows()[1][0].as_deref(), Some("JFK"));
    }

    #[test]
    fn test_incompatible_sources_are_schema_error() {
        let a = write_csv("ORIGIN,DISTANCE,\nORD,733,\n");
        let b = write_csv("ORIGIN,DEST,\nORD,LAX,\n");
        let err = CsvLoader::new(vec![path(&a), path(&b)]).load_table().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Schema(_))
        ));
    }

    #[test]
    fn test_ragged_row_is_schema_error() {
        let f = write_csv("ORIGIN,DISTANCE,\nORD,733\n");
        let err = CsvLoader::new(vec![path(&f)]).load_table().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Schema(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CsvLoader::new(vec!["/definitely/not/here.csv".into()])
            .load_table()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Io { .. })
        ));
    }

    #[test]
    fn test_no_sources_is_an_error() {
        assert!(CsvLoader::new(Vec::new()).load_table().is_err());
    }
}
