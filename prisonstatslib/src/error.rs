//! Error types for prisonstatslib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while ingesting, storing or summarising records
#[derive(Error, Debug)]
pub enum PrisonStatsError {
    /// Source document does not exist
    #[error("source file does not exist: {0}")]
    SourceNotFound(PathBuf),

    /// PDF could not be opened or its text could not be extracted
    #[error("failed to read PDF '{path}': {message}")]
    Pdf { path: PathBuf, message: String },

    /// The dataset header marker never appeared in the extracted text
    #[error("could not find a header row with value of {header}")]
    HeaderNotFound { header: String },

    /// The dataset header does not name the expected columns
    #[error("unexpected dataset header: expected `{expected}`, found `{found}`")]
    InvalidHeader { expected: String, found: String },

    /// A dataset row violates the record invariants
    #[error("invalid record on data line {line}: {message}")]
    InvalidRecord { line: u64, message: String },

    /// Two records share the same prisoner id
    #[error("duplicate prisoner id: {0}")]
    DuplicateId(u32),

    /// Operation needs at least one record
    #[error("record store is empty")]
    EmptyRecordStore,

    /// Malformed CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// SQLite error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The database connection lock was poisoned by a panicking holder
    #[error("database connection is unavailable")]
    ConnectionPoisoned,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
