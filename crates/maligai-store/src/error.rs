//! # Store Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  sqlx::Error ───────────┐                                               │
//! │  MigrateError ──────────┼──► StoreError ──► ApiError (counter app)      │
//! │  serde_json::Error ─────┘    (as Corrupt, naming the collection)        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The shop file could not be opened or created (missing or read-only
    /// directory, full disk).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin or commit of a multi-collection write failed. Nothing from the
    /// batch is kept.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A stored collection does not decode as its type, or a collection
    /// could not be encoded for writing.
    #[error("Collection '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    /// Every connection stayed busy past the acquire timeout, usually
    /// because another process holds the write lock.
    #[error("Shop database is busy")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn corrupt(key: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Corrupt {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("pool is closed".to_string()),
            sqlx::Error::Io(io) => StoreError::ConnectionFailed(io.to_string()),
            other => StoreError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_map_to_busy_and_closed() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::PoolExhausted
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolClosed),
            StoreError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_corrupt_names_the_collection() {
        let err = StoreError::corrupt("cart", "expected a sequence");
        assert_eq!(
            err.to_string(),
            "Collection 'cart' is corrupt: expected a sequence"
        );
    }
}
