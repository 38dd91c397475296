use std::path::PathBuf;
use thiserror::Error;

/// Failure to bring the model artifact into memory. Fatal for the process.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read model artifact {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported artifact format version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("invalid model artifact: {0}")]
    Invalid(String),

    #[error("model artifact digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },
}

/// Failure to score one request. Local to that request.
#[derive(Debug, Error, PartialEq)]
pub enum InferenceError {
    #[error("column '{0}' is missing from the input")]
    MissingColumn(String),

    #[error("unknown value '{value}' for column '{column}' (expected one of: {expected})")]
    UnknownCategory {
        column: String,
        value: String,
        expected: String,
    },

    #[error("column '{column}' expects a {expected} value")]
    TypeMismatch {
        column: String,
        expected: &'static str,
    },

    #[error("column '{0}' is not a finite number")]
    NonFinite(String),

    #[error("model returned {labels} labels and {probabilities} probability rows for one input row")]
    EmptyOutput { labels: usize, probabilities: usize },
}
