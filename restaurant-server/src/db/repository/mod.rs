//! Repository Module
//!
//! Persistence gateway over SQLite. Each entity module exposes free async
//! functions taking the pool; the order aggregate's multi-row writes run
//! inside single transactions.

pub mod customer;
pub mod menu_item;
pub mod order;
pub mod order_item;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    /// The primary subject of the request is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// An embedded reference in the request names a non-existent row
    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Concurrent modification; the caller may retry
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => {
                let message = db.message().to_string();
                if db.is_unique_violation() {
                    RepoError::Duplicate(message)
                } else if message.contains("database is locked")
                    || message.contains("database table is locked")
                {
                    // busy_timeout exhausted: another writer holds the lock
                    RepoError::Conflict(message)
                } else {
                    RepoError::Database(message)
                }
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
