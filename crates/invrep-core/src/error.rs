//! Error types for the invrep-core library.

use thiserror::Error;

/// Main error type for the invrep library.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Record normalization error.
    #[error("normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Aggregation error.
    #[error("aggregation error: {0}")]
    Aggregate(#[from] AggregateError),

    /// Export error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// Report storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while mapping a raw extracted record to an invoice item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// A monetary field could not be parsed.
    #[error("malformed {field} on line {line} of {file}: {value:?}")]
    MalformedAmount {
        file: String,
        line: u32,
        field: String,
        value: String,
    },

    /// A monetary field is larger than any single line may be.
    #[error("{field} on line {line} of {file} is out of range: {value}")]
    AmountOutOfRange {
        file: String,
        line: u32,
        field: String,
        value: String,
    },

    /// A non-monetary field had an unusable value.
    #[error("malformed {field} in {file}: {value:?}")]
    MalformedField {
        file: String,
        field: String,
        value: String,
    },

    /// The raw record is not a key-value object.
    #[error("record {index} of {file} is not an object")]
    NotAnObject { file: String, index: usize },
}

/// Errors related to report aggregation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// Two input files share a name and duplicates are rejected.
    #[error("duplicate filename: {0}")]
    DuplicateFilename(String),
}

/// Errors related to report export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A record's keys differ from the header.
    #[error("record {row} has keys {found:?}, expected {expected:?}")]
    HeterogeneousSchema {
        row: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// A record did not serialize to a key-value object.
    #[error("record {0} is not an object")]
    NotARecord(usize),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Output was not valid UTF-8.
    #[error("invalid UTF-8 output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Errors related to report storage.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The report identifier cannot be used as a storage key.
    #[error("invalid report id: {0:?}")]
    InvalidId(String),

    /// Stored report could not be read back.
    #[error("corrupt report {id}: {reason}")]
    Corrupt { id: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the invrep library.
pub type Result<T> = std::result::Result<T, ReportError>;
