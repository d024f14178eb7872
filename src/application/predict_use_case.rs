// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Scores new flights with a model saved by `train --artifacts-dir`:
//
//   1. Load CSV sources              (same loader as training)
//   2. Keep the five feature columns, plus DEP_DEL15 when present
//   3. Drop rows with a missing kept field
//   4. Encode with the saved feature space and run the model
//   5. Write CSV: kept columns + probability + predicted
//
// When the label column is present the accuracy of the saved model
// on these rows is logged as well.

use anyhow::{ensure, Context, Result};
use std::{io::Write, path::Path};

use crate::data::{cleaner::Cleaner, loader::CsvLoader};
use crate::domain::{
    record::{FlightFeatures, FlightRecord, DEP_DEL15, FEATURE_COLUMNS},
    table::Table,
    traits::TableSource,
};
use crate::infra::checkpoint::ArtifactStore;
use crate::ml::inferencer::Inferencer;

/// Row counts and (when labelled) accuracy for one scoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictSummary {
    pub rows_scored:  usize,
    pub rows_dropped: usize,
    pub accuracy:     Option<f64>,
}

pub struct PredictUseCase {
    inferencer:           Inferencer,
    drop_artifact_column: bool,
}

impl PredictUseCase {
    pub fn new(artifacts_dir: &str) -> Result<Self> {
        ensure!(
            Path::new(artifacts_dir).is_dir(),
            "artifact directory '{}' does not exist; run 'train --artifacts-dir' first",
            artifacts_dir
        );
        let store = ArtifactStore::new(artifacts_dir)?;
        let drop_artifact_column = store.load_config()?.drop_artifact_column;
        let inferencer = Inferencer::from_artifacts(&store)?;
        Ok(Self { inferencer, drop_artifact_column })
    }

    pub fn execute<W: Write>(&self, sources: Vec<String>, out: W) -> Result<PredictSummary> {
        let loader = CsvLoader::new(sources).with_drop_artifact_column(self.drop_artifact_column);
        self.score(&loader, out)
    }

    pub fn score<W: Write>(&self, source: &dyn TableSource, out: W) -> Result<PredictSummary> {
        let table = source.load_table().context("Failed to load flights to score")?;

        let mut kept: Vec<String> = FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect();
        let labelled = table.column_index(DEP_DEL15).is_some();
        if labelled {
            kept.push(DEP_DEL15.to_string());
        }
        let table = table.project(&kept)?;
        let (table, report) = Cleaner::new(kept).clean(table)?;

        let features      = FlightFeatures::from_table(&table)?;
        let probabilities = self.inferencer.predict(&features);

        let accuracy = if labelled {
            let records = FlightRecord::from_table(&table)?;
            let correct = records
                .iter()
                .zip(&probabilities)
                .filter(|(r, p)| (**p > 0.5) == r.delayed)
                .count();
            let acc = correct as f64 / records.len().max(1) as f64;
            tracing::info!("Accuracy on {} labelled rows: {:.4}", records.len(), acc);
            Some(acc)
        } else {
            None
        };

        write_predictions(&table, &probabilities, out)?;
        tracing::info!("Scored {} rows", probabilities.len());

        Ok(PredictSummary {
            rows_scored:  probabilities.len(),
            rows_dropped: report.rows_dropped(),
            accuracy,
        })
    }
}

fn write_predictions<W: Write>(table: &Table, probabilities: &[f32], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header: Vec<&str> = table.headers().iter().map(String::as_str).collect();
    header.extend(["probability", "predicted"]);
    writer.write_record(&header)?;

    for (row, p) in table.rows().iter().zip(probabilities) {
        let mut fields: Vec<String> = row.iter().map(|c| c.clone().unwrap_or_default()).collect();
        fields.push(format!("{p:.6}"));
        fields.push(u8::from(*p > 0.5).to_string());
        writer.write_record(&fields)?;
    }
    writer.flush()?;
    Ok(())
}
