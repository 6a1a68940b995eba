//! Errors surfaced by persistence ports.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),

    #[error("Follow-up request not found: {0}")]
    RequestNotFound(Uuid),

    #[error("Serialization failed: {0}")]
    SerializationFailed(#[source] serde_json::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        DatabaseError::QueryFailed(err)
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::SerializationFailed(err)
    }
}
