//! SQLite implementation of the observation-log repository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::models::Observation;
use crate::domain::ports::errors::DatabaseError;
use crate::domain::ports::ObservationRepository;

/// SQLite-backed executed-observation log.
#[derive(Clone)]
pub struct SqliteObservationRepository {
    pool: SqlitePool,
}

impl SqliteObservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ObservationRepository for SqliteObservationRepository {
    async fn insert_batch(
        &self,
        instrument_id: Uuid,
        observations: &[Observation],
    ) -> Result<usize, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0usize;

        for obs in observations {
            let result = sqlx::query(
                r"
                INSERT OR IGNORE INTO observations
                    (instrument_id, observation_id, obstime, ra, dec, seeing, limmag,
                     exposure_time, filter, processed_fraction, target_name)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(instrument_id.to_string())
            .bind(obs.observation_id)
            .bind(obs.obstime.to_rfc3339())
            .bind(obs.ra)
            .bind(obs.dec)
            .bind(obs.seeing)
            .bind(obs.limmag)
            .bind(obs.exposure_time)
            .bind(&obs.filter)
            .bind(obs.processed_fraction)
            .bind(&obs.target_name)
            .execute(&mut *tx)
            .await?;
            inserted += usize::try_from(result.rows_affected()).unwrap_or(0);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn count(&self, instrument_id: Uuid) -> Result<i64, DatabaseError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM observations WHERE instrument_id = ?")
                .bind(instrument_id.to_string())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
