//! Persistence port for follow-up requests, transactions and comments.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::{Comment, FacilityTransaction, FollowupRequest};
use crate::domain::ports::errors::DatabaseError;

/// Repository port for follow-up request persistence.
///
/// The compound operations exist to honor two ordering invariants:
/// transaction insertion commits before (and together with) the status
/// write on the submission path, and result comments commit atomically
/// with the final status on the fetch path.
#[async_trait]
pub trait FollowupRepository: Send + Sync {
    /// Insert a new follow-up request record.
    async fn insert(&self, request: &FollowupRequest) -> Result<(), DatabaseError>;

    /// Get a follow-up request by ID.
    async fn get(&self, id: Uuid) -> Result<Option<FollowupRequest>, DatabaseError>;

    /// Update only the request's status string.
    async fn update_status(&self, id: Uuid, status: &str) -> Result<(), DatabaseError>;

    /// Atomically insert a facility transaction and then write the status,
    /// in that order, within one database transaction.
    async fn record_submission(
        &self,
        request_id: Uuid,
        status: &str,
        transaction: &FacilityTransaction,
    ) -> Result<(), DatabaseError>;

    /// The most recently inserted transaction for a request, if any.
    async fn last_transaction(
        &self,
        request_id: Uuid,
    ) -> Result<Option<FacilityTransaction>, DatabaseError>;

    /// Atomically insert result comments and set the final status. If any
    /// insert fails nothing is committed.
    async fn post_results(
        &self,
        request_id: Uuid,
        status: &str,
        comments: &[Comment],
    ) -> Result<(), DatabaseError>;

    /// Count comments attached to an object (used by tests and callers
    /// verifying result posting).
    async fn count_comments(&self, obj_id: &str) -> Result<i64, DatabaseError>;
}
