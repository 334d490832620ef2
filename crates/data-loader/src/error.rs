//! Error types for the data-loader crate.
//!
//! Loading errors are fatal at startup: a catalog that fails to load is
//! never served. Lookup errors are the recoverable "not in the catalog"
//! case and carry the key that failed.

use crate::types::MovieId;
use thiserror::Error;

/// Errors that can occur while loading and validating the catalog
#[derive(Error, Debug)]
pub enum CatalogLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader rejected a record (bad quoting, wrong field count)
    #[error("Malformed CSV in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: u64,
        reason: String,
    },

    /// A required field was empty
    #[error("Missing {field} at line {line} in {file}")]
    MissingField {
        file: String,
        line: u64,
        field: &'static str,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// The same movie id appears twice in the movie table
    #[error("Duplicate movie id {0}")]
    DuplicateMovie(MovieId),

    /// Referenced entity doesn't exist (e.g., rating for non-existent movie)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u32 },
}

/// Read-only lookups against a loaded catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Title not found in catalog: {0}")]
    TitleNotFound(String),

    #[error("Movie {0} not found in catalog")]
    MovieNotFound(MovieId),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogLoadError>;
