//! Error taxonomy shared by store, repositories and resolver.
//!
//! # Responsibility
//! - Map every failure into one of four caller-facing kinds.
//! - Keep adapter failures intact so callers can log the underlying cause.
//!
//! # Invariants
//! - Store failures surface as `CoreError::StoreUnavailable` without rewrapping
//!   or retry.
//! - `Unauthenticated` is produced before any store access.

use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;
pub type StoreResult<T> = Result<T, StoreError>;

/// Caller-facing error for every core operation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No active owner could be resolved.
    #[error("no authenticated owner")]
    Unauthenticated,
    /// A required field was empty or invalid after normalization.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    /// Id lookup missed within the caller's owner scope.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    /// Transport or adapter failure. Retryable by the caller.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl CoreError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Only adapter failures are worth retrying; every other kind is
    /// deterministic for the same input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

/// Failure raised by a `CollectionStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database bootstrap: {0}")]
    Db(#[from] crate::db::DbError),
    #[error("store call `{operation}` timed out after {timeout_ms} ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u128,
    },
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("corrupt document in `{collection}`: {message}")]
    Corrupt {
        collection: &'static str,
        message: String,
    },
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("blocking store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl StoreError {
    pub fn corrupt(collection: &'static str, message: impl Into<String>) -> Self {
        Self::Corrupt {
            collection,
            message: message.into(),
        }
    }
}
