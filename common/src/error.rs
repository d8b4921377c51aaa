//! Error types

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "No header row found. Check that the file has recognizable columns such as Rank, SNo, Name and Rating"
    )]
    NoHeaderFound,

    #[error("Unknown dedup action: {0} (expected create, update or skip)")]
    InvalidAction(String),

    #[error("Unknown player field: {0}")]
    UnknownField(String),

    #[error("Row {row} has no existing-player match, so `{action}` cannot be applied")]
    OverrideWithoutMatch { row: usize, action: String },

    #[error("Override refers to row {0}, which is not part of this import")]
    OverrideRowOutOfRange(usize),
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;
