// ============================================================
// Layer 4 — Feature Encoder
// ============================================================
// Turns one FlightFeatures into a fixed-width Vec<f32>:
//
//   [ distance | one-hot ORIGIN | one-hot OP_CARRIER
//              | one-hot DEP_TIME_BLK | one-hot DAY_OF_WEEK ]
//
// Width = 1 + Σ|V_i|, the same for every record.
//
// The encoder owns the frozen vocabularies and the distance scaling
// chosen for the run. Both are computed from the full cleaned dataset
// and never refit per split or per batch.
//
// Out-of-vocabulary values encode to the all-zero block for that
// field. The caller gets the count back so it can be logged.

use serde::{Deserialize, Serialize};

use crate::data::vocabulary::FieldVocabularies;
use crate::domain::record::{CategoricalField, FlightFeatures, DISTANCE};

/// How the DISTANCE scalar enters the feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DistanceScaling {
    /// Raw statute miles (default)
    Raw,
    /// (d - mean) / std over the full cleaned dataset
    Standardize { mean: f32, std: f32 },
}

impl DistanceScaling {
    /// Fit standardization statistics. Population std; a degenerate
    /// column (std < 1e-10) is left unscaled around its mean.
    pub fn standardize<'a, I>(features: I) -> Self
    where
        I: IntoIterator<Item = &'a FlightFeatures>,
    {
        let distances: Vec<f64> = features.into_iter().map(|f| f.distance as f64).collect();
        if distances.is_empty() {
            return DistanceScaling::Standardize { mean: 0.0, std: 1.0 };
        }

        let n    = distances.len() as f64;
        let mean = distances.iter().sum::<f64>() / n;
        let var  = distances.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
        let std  = if var.sqrt() < 1e-10 { 1.0 } else { var.sqrt() };

        DistanceScaling::Standardize { mean: mean as f32, std: std as f32 }
    }

    pub fn apply(&self, distance: f32) -> f32 {
        match *self {
            DistanceScaling::Raw                    => distance,
            DistanceScaling::Standardize { mean, std } => (distance - mean) / std,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    vocabularies: FieldVocabularies,
    distance:     DistanceScaling,
}

impl FeatureEncoder {
    pub fn new(vocabularies: FieldVocabularies, distance: DistanceScaling) -> Self {
        tracing::info!(
            "Feature encoder: width={} (1 numeric + {} one-hot), distance={:?}",
            1 + vocabularies.total_len(),
            vocabularies.total_len(),
            distance
        );
        Self { vocabularies, distance }
    }

    pub fn vocabularies(&self) -> &FieldVocabularies { &self.vocabularies }

    pub fn distance_scaling(&self) -> DistanceScaling { self.distance }

    /// Length of every encoded vector
    pub fn width(&self) -> usize {
        1 + self.vocabularies.total_len()
    }

    /// Names of the input fields, in encoding order.
    pub fn feature_names(&self) -> Vec<&'static str> {
        std::iter::once(DISTANCE)
            .chain(self.vocabularies.iter().map(|(field, _)| field.column()))
            .collect()
    }

    /// One-hot block for a single field value (all zeros when unknown).
    pub fn encode_field(&self, field: CategoricalField, value: &str) -> Vec<f32> {
        self.vocabularies.get(field).one_hot(value)
    }

    /// Append one record's encoding to `out`.
    /// Returns the number of out-of-vocabulary fields.
    pub fn encode_into(&self, features: &FlightFeatures, out: &mut Vec<f32>) -> usize {
        out.push(self.distance.apply(features.distance));

        let mut oov = 0;
        for (field, vocab) in self.vocabularies.iter() {
            let start = out.len();
            out.resize(start + vocab.len(), 0.0);
            if !vocab.write_one_hot(field.value(features), &mut out[start..]) {
                oov += 1;
            }
        }
        oov
    }

    pub fn encode(&self, features: &FlightFeatures) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.width());
        self.encode_into(features, &mut out);
        out
    }
}
