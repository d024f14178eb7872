// ============================================================
// Layer 4 — Categorical Vocabularies
// ============================================================
// A Vocabulary is the frozen list of distinct values seen for one
// categorical column. Index i in the list is position i of that
// column's one-hot vector.
//
// Vocabularies are built ONCE from the full cleaned dataset, before
// the train/validation split, so every value in either split has a
// slot. Nothing here can add a value after construction.
//
// Order is first-seen, matching how the values appear in the
// concatenated sources.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::record::{CategoricalField, FlightFeatures};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    values: Vec<String>,
    index:  HashMap<String, usize>,
}

impl Vocabulary {
    /// Distinct values in first-seen order.
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut vocab = Self { values: Vec::new(), index: HashMap::new() };
        for v in values {
            if !vocab.index.contains_key(v) {
                vocab.index.insert(v.to_string(), vocab.values.len());
                vocab.values.push(v.to_string());
            }
        }
        vocab
    }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn values(&self) -> &[String] { &self.values }

    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.index.contains_key(value)
    }

    /// Write the one-hot encoding of `value` into `out` (len == self.len()).
    /// `out` must be zeroed. Returns false for an out-of-vocabulary
    /// value, which leaves `out` all zeros.
    pub fn write_one_hot(&self, value: &str, out: &mut [f32]) -> bool {
        debug_assert_eq!(out.len(), self.len());
        match self.index_of(value) {
            Some(i) => {
                out[i] = 1.0;
                true
            }
            None => false,
        }
    }

    pub fn one_hot(&self, value: &str) -> Vec<f32> {
        let mut out = vec![0.0; self.len()];
        self.write_one_hot(value, &mut out);
        out
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(values: Vec<String>) -> Self {
        Self::from_values(values.iter().map(String::as_str))
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.values
    }
}

/// One vocabulary per categorical field, in CategoricalField::ALL order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<(CategoricalField, Vocabulary)>",
    into = "Vec<(CategoricalField, Vocabulary)>"
)]
pub struct FieldVocabularies {
    fields: Vec<(CategoricalField, Vocabulary)>,
}

impl FieldVocabularies {
    /// Scan every record once per field.
    pub fn build<'a, I>(features: I) -> Self
    where
        I: IntoIterator<Item = &'a FlightFeatures>,
        I::IntoIter: Clone,
    {
        let iter = features.into_iter();
        let fields = CategoricalField::ALL
            .iter()
            .map(|&field| {
                let vocab = Vocabulary::from_values(iter.clone().map(|f| field.value(f)));
                tracing::info!("Vocabulary {}: {} values", field.column(), vocab.len());
                (field, vocab)
            })
            .collect();
        Self { fields }
    }

    pub fn get(&self, field: CategoricalField) -> &Vocabulary {
        &self.fields[field as usize].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoricalField, &Vocabulary)> {
        self.fields.iter().map(|(f, v)| (*f, v))
    }

    /// Σ|V_i| over all categorical fields
    pub fn total_len(&self) -> usize {
        self.fields.iter().map(|(_, v)| v.len()).sum()
    }
}

impl TryFrom<Vec<(CategoricalField, Vocabulary)>> for FieldVocabularies {
    type Error = String;

    fn try_from(fields: Vec<(CategoricalField, Vocabulary)>) -> Result<Self, Self::Error> {
        let order: Vec<CategoricalField> = fields.iter().map(|(f, _)| *f).collect();
        if order != CategoricalField::ALL {
            return Err(format!(
                "expected vocabularies for {:?}, found {:?}",
                CategoricalField::ALL,
                order
            ));
        }
        Ok(Self { fields })
    }
}

impl From<FieldVocabularies> for Vec<(CategoricalField, Vocabulary)> {
    fn from(vocabs: FieldVocabularies) -> Self {
        vocabs.fields
    }
}
