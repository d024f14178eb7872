// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// Every failure the data pipeline can raise before training:
//
//   Io      : a source could not be read or fetched
//   Schema  : an expected column is missing, or sources disagree
//   Encoding: a present value cannot be parsed (e.g. text in DISTANCE)
//
// All three are fatal. Out-of-vocabulary categorical values are
// deliberately NOT an error: they encode to the zero vector.
//
// The application layer wraps these in anyhow::Error, so callers
// that care can still downcast to PipelineError.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source file or URI unreadable / unreachable
    #[error("cannot read source '{location}': {source}")]
    Io {
        location: String,
        #[source]
        source:   BoxError,
    },

    /// Column missing from a source, from the retained projection,
    /// or mismatched between sources
    #[error("schema error: {0}")]
    Schema(String),

    /// A present but malformed value
    #[error("cannot encode value '{value}' in column {column} (row {row})")]
    Encoding {
        row:    usize,
        column: String,
        value:  String,
    },
}

impl PipelineError {
    pub fn io(location: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Io { location: location.into(), source: source.into() }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }
}
