//! Executed-observation log rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One normalized executed observation, as inserted into the platform's
/// observation log for an instrument.
///
/// `seeing` and `limmag` are carried for schema compatibility but Swift
/// never reports them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub observation_id: i64,
    pub obstime: DateTime<Utc>,
    pub ra: f64,
    pub dec: f64,
    pub seeing: Option<f64>,
    pub limmag: Option<f64>,
    pub exposure_time: f64,
    /// Filter string, e.g. `uvot::u`.
    pub filter: String,
    pub processed_fraction: f64,
    pub target_name: String,
}
