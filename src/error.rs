//! Error types for geomark operations.

use thiserror::Error;

/// Errors produced while loading data, validating configuration, or running
/// a benchmark. All of them are fatal at the binary level: the process logs
/// the error and exits nonzero, there is no partial-failure recovery.
#[derive(Error, Debug)]
pub enum GeomarkError {
    /// Underlying I/O failure (unreadable file, failed write, ...)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A WKT line that is empty of usable geometry or fails to parse
    #[error("bad geometry {path}:{line}")]
    BadGeometry { path: String, line: usize },

    /// A binary cache file with a wrong checksum sentinel or truncated payload
    #[error("bad checksum {path}")]
    BadCache { path: String },

    /// Invalid or inconsistent configuration (unknown enum string, zero
    /// repeat count, missing input file, ...)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON report serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result type used throughout the crate.
pub type Result<T> = std::result::Result<T, GeomarkError>;
