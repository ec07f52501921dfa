use crate::lock::EntityKind;
use thiserror::Error;

/// Storage-specific error types for the tracker server.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or query execution failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution failed
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Entity not found in the database
    #[error("entity not found: {entity_type} with {field}={value}")]
    NotFound {
        entity_type: &'static str,
        field: &'static str,
        value: String,
    },

    /// Exclusive row access could not be acquired within the budget;
    /// the attempted update is abandoned, never half-applied
    #[error("could not acquire exclusive access to {kind} row {id} within {timeout_ms}ms")]
    LockTimeout {
        kind: EntityKind,
        id: i64,
        timeout_ms: u64,
    },

    /// Configuration error (paths, pool options)
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
