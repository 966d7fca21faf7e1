//! Error types for the DTED library.

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a DTED file is rejected while parsing.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The file could not be read.
    #[error("unreadable file: {0}")]
    Unreadable(#[source] std::io::Error),

    /// The file does not start with the `UHL` user header label.
    #[error("missing UHL sentinel")]
    MissingSentinel,

    /// A fixed-width header field could not be decoded.
    #[error("invalid header field {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    /// The header declares an empty grid.
    #[error("non-positive grid dimensions: {columns} columns x {rows} rows")]
    NonPositiveDimension { columns: i64, rows: i64 },

    /// The file is shorter than the header-declared grid requires.
    #[error("truncated file: {size} bytes (expected at least {expected})")]
    Truncated { size: usize, expected: usize },

    /// A data record does not start with the `0xAA` record sentinel.
    #[error("invalid data record for column {column}")]
    InvalidRecord { column: usize },
}

/// Errors that can occur when working with DTED data.
#[derive(Error, Debug)]
pub enum DtedError {
    /// The file is not a readable, well-formed DTED tile.
    #[error("DTED format error in {path}: {kind}")]
    Format { path: PathBuf, kind: FormatError },

    /// A posting index lies outside the grid.
    #[error("Posting index out of range: column={column}, row={row} (grid is {columns} columns x {rows} rows)")]
    IndexOutOfRange {
        column: usize,
        row: usize,
        columns: usize,
        rows: usize,
    },

    /// A scan target does not exist.
    #[error("DTED path not found: {path}")]
    NotFound { path: PathBuf },

    /// IO error while walking directories.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DtedError {
    pub(crate) fn format(path: impl Into<PathBuf>, kind: FormatError) -> Self {
        DtedError::Format {
            path: path.into(),
            kind,
        }
    }

    /// Returns `true` for malformed, truncated or unreadable tiles.
    pub fn is_format_error(&self) -> bool {
        matches!(self, DtedError::Format { .. })
    }
}

/// Result type alias using [`DtedError`].
pub type Result<T> = std::result::Result<T, DtedError>;
