// ============================================================
// Layer 3 — Flight Record Domain Type
// ============================================================
// One flight observation after cleaning. Only information known
// before takeoff is kept as a feature:
//
//   DAY_OF_WEEK   categorical  "1".."7"
//   OP_CARRIER    categorical  "AA", "UA", ...
//   ORIGIN        categorical  "ORD", "LAX", ...
//   DEP_TIME_BLK  categorical  "0600-0659", ...
//   DISTANCE      numeric      statute miles, >= 0
//
// and the label DEP_DEL15 (departure delayed 15+ minutes).

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::table::Table;

pub const DAY_OF_WEEK:  &str = "DAY_OF_WEEK";
pub const OP_CARRIER:   &str = "OP_CARRIER";
pub const ORIGIN:       &str = "ORIGIN";
pub const DEP_TIME_BLK: &str = "DEP_TIME_BLK";
pub const DISTANCE:     &str = "DISTANCE";
pub const DEP_DEL15:    &str = "DEP_DEL15";

/// The model inputs, without the label.
pub const FEATURE_COLUMNS: [&str; 5] = [DAY_OF_WEEK, OP_CARRIER, ORIGIN, DEP_TIME_BLK, DISTANCE];

/// Columns kept after cleaning unless configured otherwise.
pub const DEFAULT_RETAINED_COLUMNS: [&str; 6] =
    [DAY_OF_WEEK, OP_CARRIER, ORIGIN, DEP_DEL15, DEP_TIME_BLK, DISTANCE];

/// The categorical inputs, in feature-vector order.
/// Declaration order == ALL order, so `field as usize` is its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoricalField {
    Origin,
    Carrier,
    DepTimeBlock,
    DayOfWeek,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 4] = [
        CategoricalField::Origin,
        CategoricalField::Carrier,
        CategoricalField::DepTimeBlock,
        CategoricalField::DayOfWeek,
    ];

    /// Source column name
    pub fn column(self) -> &'static str {
        match self {
            CategoricalField::Origin       => ORIGIN,
            CategoricalField::Carrier      => OP_CARRIER,
            CategoricalField::DepTimeBlock => DEP_TIME_BLK,
            CategoricalField::DayOfWeek    => DAY_OF_WEEK,
        }
    }

    pub fn value(self, features: &FlightFeatures) -> &str {
        match self {
            CategoricalField::Origin       => &features.origin,
            CategoricalField::Carrier      => &features.carrier,
            CategoricalField::DepTimeBlock => &features.dep_time_blk,
            CategoricalField::DayOfWeek    => &features.day_of_week,
        }
    }
}

/// Everything the model sees for one flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightFeatures {
    pub day_of_week:  String,
    pub carrier:      String,
    pub origin:       String,
    pub dep_time_blk: String,
    pub distance:     f32,
}

/// A labelled observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub features: FlightFeatures,
    /// DEP_DEL15 == 1
    pub delayed:  bool,
}

impl FlightFeatures {
    /// Parse every row of a cleaned table into features.
    pub fn from_table(table: &Table) -> Result<Vec<FlightFeatures>, PipelineError> {
        let columns = FeatureColumns::locate(table)?;
        table
            .rows()
            .iter()
            .enumerate()
            .map(|(row, cells)| columns.parse(row, cells))
            .collect()
    }
}

impl FlightRecord {
    /// Parse every row of a cleaned table into labelled records.
    /// The table must contain the five feature columns and DEP_DEL15.
    pub fn from_table(table: &Table) -> Result<Vec<FlightRecord>, PipelineError> {
        let columns = FeatureColumns::locate(table)?;
        let label   = table.require_column(DEP_DEL15)?;

        table
            .rows()
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let features = columns.parse(row, cells)?;
                let delayed  = parse_label(row, cell(row, cells, label, DEP_DEL15)?)?;
                Ok(FlightRecord { features, delayed })
            })
            .collect()
    }

    /// 0/1 label as used by the loss function
    pub fn label(&self) -> i32 {
        i32::from(self.delayed)
    }
}

/// Column positions of the feature fields inside one table.
struct FeatureColumns {
    day_of_week:  usize,
    carrier:      usize,
    origin:       usize,
    dep_time_blk: usize,
    distance:     usize,
}

impl FeatureColumns {
    fn locate(table: &Table) -> Result<Self, PipelineError> {
        Ok(Self {
            day_of_week:  table.require_column(DAY_OF_WEEK)?,
            carrier:      table.require_column(OP_CARRIER)?,
            origin:       table.require_column(ORIGIN)?,
            dep_time_blk: table.require_column(DEP_TIME_BLK)?,
            distance:     table.require_column(DISTANCE)?,
        })
    }

    fn parse(&self, row: usize, cells: &[Option<String>]) -> Result<FlightFeatures, PipelineError> {
        Ok(FlightFeatures {
            day_of_week:  canonical_day(cell(row, cells, self.day_of_week, DAY_OF_WEEK)?),
            carrier:      cell(row, cells, self.carrier, OP_CARRIER)?.to_string(),
            origin:       cell(row, cells, self.origin, ORIGIN)?.to_string(),
            dep_time_blk: cell(row, cells, self.dep_time_blk, DEP_TIME_BLK)?.to_string(),
            distance:     parse_distance(row, cell(row, cells, self.distance, DISTANCE)?)?,
        })
    }
}

fn cell<'a>(
    row:    usize,
    cells:  &'a [Option<String>],
    index:  usize,
    column: &str,
) -> Result<&'a str, PipelineError> {
    cells[index].as_deref().ok_or_else(|| PipelineError::Encoding {
        row,
        column: column.to_string(),
        value:  "<missing>".to_string(),
    })
}

// "3.0" and "3" name the same day
fn canonical_day(raw: &str) -> String {
    match raw.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v.is_finite() => format!("{}", v as i64),
        _ => raw.to_string(),
    }
}

fn parse_distance(row: usize, raw: &str) -> Result<f32, PipelineError> {
    match raw.parse::<f32>() {
        Ok(d) if d.is_finite() && d >= 0.0 => Ok(d),
        _ => Err(PipelineError::Encoding {
            row,
            column: DISTANCE.to_string(),
            value:  raw.to_string(),
        }),
    }
}

fn parse_label(row: usize, raw: &str) -> Result<bool, PipelineError> {
    match raw.parse::<f64>() {
        Ok(v) if v == 0.0 => Ok(false),
        Ok(v) if v == 1.0 => Ok(true),
        _ => Err(PipelineError::Encoding {
            row,
            column: DEP_DEL15.to_string(),
            value:  raw.to_string(),
        }),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::parse_cell;

    fn table(rows: &[[&str; 6]]) -> Table {
        let headers = DEFAULT_RETAINED_COLUMNS.iter().map(|s| s.to_string()).collect();
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|v| parse_cell(v)).collect())
            .collect();
        Table::new(headers, rows).unwrap()
    }

    #[test]
    fn test_parses_float_encoded_fields() {
        // DAY_OF_WEEK, OP_CARRIER, ORIGIN, DEP_DEL15, DEP_TIME_BLK, DISTANCE
        let t = table(&[["3.0", "AA", "ORD", "1.0", "0600-0659", "733.0"]]);
        let records = FlightRecord::from_table(&t).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].features.day_of_week, "3");
        assert_eq!(records[0].features.distance, 733.0);
        assert!(records[0].delayed);
        assert_eq!(records[0].label(), 1);
    }

    #[test]
    fn test_non_numeric_distance_fails_fast() {
        let t = table(&[["3", "AA", "ORD", "0", "0600-0659", "far"]]);
        let err = FlightRecord::from_table(&t).unwrap_err();
        match err {
            PipelineError::Encoding { column, value, row } => {
                assert_eq!(column, DISTANCE);
                assert_eq!(value, "far");
                assert_eq!(row, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_distance_rejected() {
        let t = table(&[["3", "AA", "ORD", "0", "0600-0659", "-5"]]);
        assert!(matches!(
            FlightRecord::from_table(&t),
            Err(PipelineError::Encoding { .. })
        ));
    }

    #[test]
    fn test_label_must_be_binary() {
        let t = table(&[["3", "AA", "ORD", "2", "0600-0659", "100"]]);
        assert!(matches!(
            FlightRecord::from_table(&t),
            Err(PipelineError::Encoding { .. })
        ));
    }

    #[test]
    fn test_missing_feature_column_is_schema_error() {
        let t = table(&[["3", "AA", "ORD", "0", "0600-0659", "100"]]);
        let without_origin = t
            .project(&[DAY_OF_WEEK, OP_CARRIER, DEP_DEL15, DEP_TIME_BLK, DISTANCE]
                .map(String::from))
            .unwrap();
        assert!(matches!(
            FlightRecord::from_table(&without_origin),
            Err(PipelineError::Schema(_))
        ));
    }

    #[test]
    fn test_features_parse_without_label() {
        let t = table(&[["5", "UA", "LAX", "0", "1800-1859", "2475"]]);
        let no_label = t
            .project(&FEATURE_COLUMNS.map(String::from))
            .unwrap();
        let features = FlightFeatures::from_table(&no_label).unwrap();
        assert_eq!(features[0].origin, "LAX");
        assert_eq!(CategoricalField::Carrier.value(&features[0]), "UA");
    }
}
