//! Repository error model and SQLx error mapping.
//!
//! | SQLx error | Postgres code | `RepositoryError` |
//! |------------|---------------|-------------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | any | `Storage` |
//! | PoolClosed / PoolTimedOut / Io / other | n/a | `Storage` |

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    /// Connection, transaction, or query failure. The message is for logs only.
    #[error("storage error: {0}")]
    Storage(String),
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    let mapped = match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => RepositoryError::Conflict(msg),
                _ => RepositoryError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Storage(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            RepositoryError::Storage(format!("timed out acquiring connection in {}", operation))
        }
        other => RepositoryError::Storage(format!("sqlx error in {}: {}", operation, other)),
    };
    match &mapped {
        RepositoryError::Conflict(_) => tracing::warn!(operation, error = %mapped, "storage conflict"),
        _ => tracing::error!(operation, error = %mapped, "storage operation failed"),
    }
    mapped
}

pub(crate) fn lock_poisoned() -> RepositoryError {
    RepositoryError::Storage("lock poisoned".to_string())
}
