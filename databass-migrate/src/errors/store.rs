//! Graph store error types.
use thiserror::Error;

/// Failures reported by a `GraphStore` implementation.
///
/// All of them are fatal to a migration run: retrying after a partial write
/// would duplicate nodes.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Could not reach or authenticate against the target store.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A write or read query was rejected.
    #[error("Query error: {0}")]
    Query(String),

    /// The store answered with something we could not interpret.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A write would break a uniqueness constraint.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// An edge endpoint does not exist in the store.
    #[error("Edge endpoint not found: {0}")]
    MissingEndpoint(String),
}

impl StoreError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    pub fn missing_endpoint(msg: impl Into<String>) -> Self {
        Self::MissingEndpoint(msg.into())
    }
}
