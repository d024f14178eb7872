use burn::data::dataset::Dataset;

use crate::domain::record::FlightRecord;

/// One split (train or validation) held fully in memory.
pub struct FlightDataset {
    records: Vec<FlightRecord>,
}

impl FlightDataset {
    pub fn new(records: Vec<FlightRecord>) -> Self { Self { records } }

    pub fn records(&self) -> &[FlightRecord] { &self.records }

    /// Share of records labelled delayed, for the run log
    pub fn delayed_ratio(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let delayed = self.records.iter().filter(|r| r.delayed).count();
        delayed as f64 / self.records.len() as f64
    }
}

impl Dataset<FlightRecord> for FlightDataset {
    fn get(&self, index: usize) -> Option<FlightRecord> {
        self.records.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
