//! Persistence port for the executed-observation log.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::Observation;
use crate::domain::ports::errors::DatabaseError;

/// Repository port for instrument observation-log rows.
#[async_trait]
pub trait ObservationRepository: Send + Sync {
    /// Bulk-insert observations for an instrument, skipping rows already
    /// present for the same `(observation_id, filter)`. Returns the number
    /// of rows inserted.
    async fn insert_batch(
        &self,
        instrument_id: Uuid,
        observations: &[Observation],
    ) -> Result<usize, DatabaseError>;

    /// Count rows stored for an instrument.
    async fn count(&self, instrument_id: Uuid) -> Result<i64, DatabaseError>;
}
