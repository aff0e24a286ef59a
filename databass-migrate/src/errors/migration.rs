//! Top-level error for a migration run.
use thiserror::Error;

use crate::errors::{LookupError, ParseError, StoreError};
use crate::models::EntityType;

/// Any failure that aborts a migration run.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Export error: {0}")]
    Parse(#[from] ParseError),
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("{entity} '{row_id}' column '{column}' references a missing row: {source}")]
    OrphanReference {
        entity: EntityType,
        row_id: String,
        column: &'static str,
        source: LookupError,
    },
    #[error("Migration has already been run with this executor")]
    AlreadyStarted,
}

impl MigrationError {
    /// The lookup failure behind this error, if any.
    pub fn lookup(&self) -> Option<&LookupError> {
        match self {
            MigrationError::Lookup(e) | MigrationError::OrphanReference { source: e, .. } => {
                Some(e)
            }
            _ => None,
        }
    }
}
