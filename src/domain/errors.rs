//! Domain errors for the Swift facility adapter.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while translating, submitting or fetching
/// Swift facility requests.
#[derive(Debug, Error)]
pub enum FacilityError {
    /// The allocation carries no credential bundle. Fatal precondition:
    /// nothing is sent to the facility.
    #[error("Missing allocation information")]
    MissingCredentials,

    #[error("Follow-up request not found: {0}")]
    RequestNotFound(Uuid),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The facility rejected a submission. Recorded on the request status,
    /// never raised on the submit path itself.
    #[error("Facility rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The facility has not finished the job yet. Recoverable; callers are
    /// expected to retry the fetch later. Nothing has been mutated.
    #[error("Result not yet available. Please try again later.")]
    ResultNotReady,

    #[error("Download failed: {0}")]
    Download(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type FacilityResult<T> = Result<T, FacilityError>;

impl From<crate::domain::ports::errors::DatabaseError> for FacilityError {
    fn from(err: crate::domain::ports::errors::DatabaseError) -> Self {
        match err {
            crate::domain::ports::errors::DatabaseError::RequestNotFound(id) => {
                FacilityError::RequestNotFound(id)
            }
            other => FacilityError::Database(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for FacilityError {
    fn from(err: sqlx::Error) -> Self {
        FacilityError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for FacilityError {
    fn from(err: serde_json::Error) -> Self {
        FacilityError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for FacilityError {
    fn from(err: reqwest::Error) -> Self {
        FacilityError::Http(err.to_string())
    }
}

impl From<std::io::Error> for FacilityError {
    fn from(err: std::io::Error) -> Self {
        FacilityError::Download(err.to_string())
    }
}
