// ============================================================
// Layer 3 — Table Domain Type
// ============================================================
// An untyped table as read from CSV: a header row plus data rows.
// Every cell is Option<String>; None marks a missing field.
//
// The loader produces one Table per source and concatenates them;
// the cleaner drops incomplete rows and projects columns. Only after
// that do rows become typed FlightRecords.

use super::error::PipelineError;

/// Raw markers treated as a missing field (pandas' default NA set,
/// restricted to the spellings that appear in flight exports).
const MISSING_MARKERS: &[&str] = &["", "NA", "NaN", "nan", "NULL", "null"];

/// Convert one raw CSV cell into a table cell.
pub fn parse_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows:    Vec<Vec<Option<String>>>,
}

impl Table {
    /// Build a table, checking every row has one cell per header.
    pub fn new(
        headers: Vec<String>,
        rows:    Vec<Vec<Option<String>>>,
    ) -> Result<Self, PipelineError> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != headers.len())
        {
            return Err(PipelineError::schema(format!(
                "row {} has {} fields but the header has {}",
                i,
                row.len(),
                headers.len()
            )));
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] { &self.headers }

    pub fn rows(&self) -> &[Vec<Option<String>>] { &self.rows }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn width(&self) -> usize { self.headers.len() }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like column_index, but a missing column is a SchemaError.
    pub fn require_column(&self, name: &str) -> Result<usize, PipelineError> {
        self.column_index(name).ok_or_else(|| {
            PipelineError::schema(format!(
                "column '{}' not found (available: {})",
                name,
                self.headers.join(", ")
            ))
        })
    }

    /// Remove one column from the header and from every row.
    pub fn drop_column(&mut self, index: usize) -> String {
        for row in &mut self.rows {
            row.remove(index);
        }
        self.headers.remove(index)
    }

    /// Append `other`'s rows. Both tables must carry the same column
    /// set; `other` is re-ordered to match this table's header order.
    pub fn append(&mut self, other: Table) -> Result<(), PipelineError> {
        let mut mine:   Vec<&String> = self.headers.iter().collect();
        let mut theirs: Vec<&String> = other.headers.iter().collect();
        mine.sort();
        theirs.sort();
        if mine != theirs {
            return Err(PipelineError::schema(format!(
                "incompatible column sets: [{}] vs [{}]",
                self.headers.join(", "),
                other.headers.join(", ")
            )));
        }

        // Position in `other` of each of our columns
        let order: Vec<usize> = self
            .headers
            .iter()
            .map(|h| other.require_column(h))
            .collect::<Result<_, _>>()?;

        self.rows.extend(other.rows.into_iter().map(|mut row| {
            order.iter().map(|&i| row[i].take()).collect()
        }));
        Ok(())
    }

    /// Keep only the rows for which `keep` returns true.
    /// Returns how many rows were removed.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[Option<String>]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|r| keep(r));
        before - self.rows.len()
    }

    /// New table with only `columns`, in the given order.
    pub fn project(&self, columns: &[String]) -> Result<Table, PipelineError> {
        let indices: Vec<usize> = columns
            .iter()
            .map(|c| self.require_column(c))
            .collect::<Result<_, _>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Table { headers: columns.to_vec(), rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| parse_cell(v)).collect()
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_markers() {
        assert_eq!(parse_cell(""), None);
        assert_eq!(parse_cell("   "), None);
        assert_eq!(parse_cell("NaN"), None);
        assert_eq!(parse_cell(" ORD "), Some("ORD".to_string()));
        assert_eq!(parse_cell("0"), Some("0".to_string()));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Table::new(headers(&["A", "B"]), vec![cells(&["1"])]).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }

    #[test]
    fn test_append_aligns_column_order() {
        let mut a = Table::new(headers(&["A", "B"]), vec![cells(&["1", "2"])]).unwrap();
        let b     = Table::new(headers(&["B", "A"]), vec![cells(&["20", "10"])]).unwrap();
        a.append(b).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.rows()[1], cells(&["10", "20"]));
    }

    #[test]
    fn test_append_rejects_different_columns() {
        let mut a = Table::new(headers(&["A", "B"]), vec![]).unwrap();
        let b     = Table::new(headers(&["A", "C"]), vec![]).unwrap();
        assert!(matches!(a.append(b), Err(PipelineError::Schema(_))));
    }

    #[test]
    fn test_project_and_missing_column() {
        let t = Table::new(headers(&["A", "B", "C"]), vec![cells(&["1", "2", "3"])]).unwrap();
        let p = t.project(&headers(&["C", "A"])).unwrap();
        assert_eq!(p.headers(), &headers(&["C", "A"])[..]);
        assert_eq!(p.rows()[0], cells(&["3", "1"]));

        assert!(matches!(
            t.project(&headers(&["Z"])),
            Err(PipelineError::Schema(_))
        ));
    }

    #[test]
    fn test_drop_column() {
        let mut t = Table::new(headers(&["A", ""]), vec![cells(&["1", ""])]).unwrap();
        assert_eq!(t.drop_column(1), "");
        assert_eq!(t.width(), 1);
        assert_eq!(t.rows()[0].len(), 1);
    }
}
