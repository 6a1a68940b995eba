//! Backfill of the executed-observation log from the Swift archive.
//!
//! Pulls every archive row in a UT window, decodes each row's UVOT mode
//! to recover the filter actually flown, and bulk-inserts the normalized
//! rows for the allocation's instrument. The network and database work
//! runs on the worker pool; the synchronous part of `retrieve` only
//! validates inputs.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::adapters::swift::models::{ArchiveRow, ObsQueryParams, UvotModeEntry};
use crate::adapters::swift::SwiftClient;
use crate::domain::errors::{FacilityError, FacilityResult};
use crate::domain::models::request::parse_ut_timestamp;
use crate::domain::models::{Allocation, Observation};
use crate::domain::ports::ObservationRepository;

use super::worker_pool::WorkerPool;

/// Fetches executed observations for an allocation's instrument.
pub struct ObservationBackfill {
    client: SwiftClient,
    repo: Arc<dyn ObservationRepository>,
    pool: WorkerPool,
}

impl ObservationBackfill {
    pub fn new(
        client: SwiftClient,
        repo: Arc<dyn ObservationRepository>,
        pool: WorkerPool,
    ) -> Self {
        Self { client, repo, pool }
    }

    /// Backfill observations executed between `start_date` and `end_date`.
    ///
    /// Credential and window validation happen before any network call;
    /// the archive query and inserts run in the background.
    pub fn retrieve(
        &self,
        allocation: &Allocation,
        start_date: &str,
        end_date: &str,
    ) -> FacilityResult<()> {
        allocation.credentials()?;

        let start = parse_ut_timestamp(start_date).ok_or_else(|| {
            FacilityError::Validation(format!("Could not parse start_date: {start_date}"))
        })?;
        let end = parse_ut_timestamp(end_date).ok_or_else(|| {
            FacilityError::Validation(format!("Could not parse end_date: {end_date}"))
        })?;
        if start > end {
            return Err(FacilityError::Validation(
                "start_date must be before end_date.".to_string(),
            ));
        }

        // Whole-sky window query: no cone parameters.
        let params = ObsQueryParams {
            ra: None,
            dec: None,
            radius: None,
            begin: start.format("%Y-%m-%d %H:%M:%S").to_string(),
            end: end.format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        let client = self.client.clone();
        let repo = Arc::clone(&self.repo);
        let instrument_id = allocation.instrument_id;

        self.pool.spawn("swift-observation-backfill", async move {
            backfill_window(&client, repo.as_ref(), instrument_id, &params).await
        });
        Ok(())
    }
}

/// Background task: query the archive window, decode UVOT modes (cached
/// per distinct mode) and insert the normalized rows.
async fn backfill_window(
    client: &SwiftClient,
    repo: &dyn ObservationRepository,
    instrument_id: Uuid,
    params: &ObsQueryParams,
) -> FacilityResult<()> {
    let rows = client.query_observations(params).await?;
    tracing::info!(instrument_id = %instrument_id, rows = rows.len(), "archive window fetched");

    let mut mode_cache: HashMap<String, Option<Vec<UvotModeEntry>>> = HashMap::new();
    let mut observations = Vec::with_capacity(rows.len());

    for row in &rows {
        if !mode_cache.contains_key(&row.uvot) {
            let entries = client.uvot_mode_entries(&row.uvot).await?;
            mode_cache.insert(row.uvot.clone(), entries);
        }
        let entries = mode_cache
            .get(&row.uvot)
            .and_then(|e| e.as_deref())
            .unwrap_or(&[]);
        match normalize_row(row, entries) {
            Some(observation) => observations.push(observation),
            None => tracing::debug!(obsid = %row.obsid, "skipping archive row"),
        }
    }

    let inserted = repo.insert_batch(instrument_id, &observations).await?;
    tracing::info!(
        instrument_id = %instrument_id,
        inserted,
        skipped = rows.len() - observations.len(),
        "observation backfill complete"
    );
    Ok(())
}

/// Normalize one archive row into an observation-log row.
///
/// Rows are dropped when the UVOT mode decodes to no filters, when the
/// archive has no pointing for the row, or when the obsid or start time
/// does not parse. The filter is the first filter of the decoded mode,
/// namespaced as `uvot::<filter>`.
fn normalize_row(row: &ArchiveRow, mode_entries: &[UvotModeEntry]) -> Option<Observation> {
    let first_filter = mode_entries.first()?;
    let ra = row.ra_object?;
    let dec = row.dec_object?;
    let observation_id: i64 = row.obsid.trim().parse().ok()?;
    let obstime = parse_ut_timestamp(&row.begin)?;

    Some(Observation {
        observation_id,
        obstime,
        ra,
        dec,
        seeing: None,
        limmag: None,
        exposure_time: row.exposure,
        filter: format!("uvot::{}", first_filter.filter_name),
        processed_fraction: 1.0,
        target_name: row.targname.clone(),
    })
}
