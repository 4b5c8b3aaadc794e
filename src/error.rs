//! Error types for the classifier and its corpus reader.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Prediction was requested before any document was ingested.
    #[error("model has not been trained: no documents or labels were ingested")]
    ModelNotTrained,

    /// A corpus row (or its header) is missing the `tag` or `content` field.
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
