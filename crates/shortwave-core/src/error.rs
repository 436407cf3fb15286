use thiserror::Error;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A backend that enforces URL uniqueness rejected an insert.
    /// Carries the offending original URL so callers can answer
    /// "already shortened" instead of "internal error".
    #[error("{0} already exists")]
    DuplicateUrl(String),
    /// No record has the requested id.
    #[error("link {0} not found")]
    NotFound(String),
    /// Batch delete was called with zero ids.
    #[error("empty batch: nothing to delete")]
    EmptyBatch,
    /// Begin/prepare/commit/rollback failed in the database backend.
    #[error("transaction failed: {0}")]
    Transaction(String),
    /// A query or statement execution failed.
    #[error("query failed: {0}")]
    Query(String),
    /// The storage backend cannot be reached.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    /// A work item was rejected before it reached the database.
    #[error("invalid id: {0}")]
    InvalidId(String),
    /// File backend open/read/write failure.
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    /// The file backend's on-disk array could not be encoded or decoded.
    #[error("serialization failed: {0}")]
    Serialization(String),
}
