//! Errors raised while reading the flat-file exports.
use thiserror::Error;

use crate::models::EntityType;

/// A malformed or unreadable export file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to open {file}: {source}")]
    Io {
        file: String,
        source: std::io::Error,
    },
    #[error("Malformed CSV in {file}: {source}")]
    Csv { file: String, source: csv::Error },
    #[error("{file} is missing column '{column}'")]
    MissingColumn { file: String, column: String },
    #[error("{file} has column '{column}' more than once")]
    DuplicateColumn { file: String, column: String },
    #[error("{file} line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        file: String,
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("{file} line {line}: column '{column}' must not be empty")]
    MissingValue {
        file: String,
        line: u64,
        column: String,
    },
    #[error("{file} line {line}: column '{column}' is not an integer: '{value}'")]
    InvalidInteger {
        file: String,
        line: u64,
        column: String,
        value: String,
    },
    #[error("{0} has no export file")]
    NotExported(EntityType),
}
