//! Follow-up request domain models.
//!
//! A [`FollowupRequest`] is the platform-owned record this adapter acts on.
//! Its payload is a closed tagged union keyed by the `request_type`
//! discriminator, so an unknown request type fails at deserialization
//! instead of deep inside a submission path.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::allocation::Allocation;

/// The sky target a follow-up request points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Platform object identifier (e.g., a transient name).
    pub id: String,
    /// Right ascension in degrees.
    pub ra: f64,
    /// Declination in degrees.
    pub dec: f64,
    /// Opaque key used by platform refresh signals.
    pub internal_key: String,
}

/// A generic follow-up request as stored by the platform.
///
/// The adapter reads every field but mutates only `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowupRequest {
    pub id: Uuid,
    pub obj: Target,
    pub allocation: Allocation,
    pub payload: RequestPayload,
    /// Free-text status, e.g. `"submitted"` or `"rejected: ..."`.
    pub status: String,
    /// The platform user who last touched the request; notification and
    /// refresh signals are addressed to them.
    pub last_modified_by: Uuid,
}

impl FollowupRequest {
    /// Group IDs the requester can see; result comments inherit these.
    pub fn accessible_group_ids(&self) -> Vec<Uuid> {
        self.allocation.group_ids.clone()
    }
}

/// User-facing request payload, discriminated by `request_type`.
///
/// The variant tags are the exact strings the platform form submits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "request_type")]
pub enum RequestPayload {
    #[serde(rename = "XRT/UVOT ToO")]
    Too(TooForm),
    #[serde(rename = "XRT API")]
    XrtJob(XrtJobForm),
    #[serde(rename = "XRT/UVOT/BAT Data")]
    DataQuery(DataQueryForm),
}

impl RequestPayload {
    /// The wire discriminator for this payload.
    pub fn request_type(&self) -> &'static str {
        match self {
            Self::Too(_) => "XRT/UVOT ToO",
            Self::XrtJob(_) => "XRT API",
            Self::DataQuery(_) => "XRT/UVOT/BAT Data",
        }
    }
}

fn default_exposure_time() -> f64 {
    4000.0
}

fn default_exposure_counts() -> f64 {
    1.0
}

fn default_monitoring_freq() -> i64 {
    1
}

fn default_xrt_countrate() -> f64 {
    0.0025
}

fn default_urgency() -> String {
    "3".to_string()
}

fn default_obs_type() -> String {
    "Light Curve".to_string()
}

fn default_source_type() -> String {
    "Optical fast transient".to_string()
}

fn default_exp_time_just() -> String {
    "At ~2.5e-3 counts/sec, 4ks should suffice to achieve a high SNR, \
     assuming a background of ~1e-4 counts/sec (Pagani et al. 2007)"
        .to_string()
}

fn default_immediate_objective() -> String {
    "We wish to measure the X-ray emission of an optically discovered \
     potential orphan afterglow/kilonova."
        .to_string()
}

fn default_uvot_mode() -> String {
    "0x9999 - Default (Filter of the day)".to_string()
}

fn default_science_just() -> String {
    "An X-ray detection of this transient will further associate this object \
     to a relativistic explosion and will help unveil the nature of the \
     progenitor type."
        .to_string()
}

/// Form fields for an `"XRT/UVOT ToO"` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TooForm {
    /// Exposure time per visit in seconds.
    #[serde(default = "default_exposure_time")]
    pub exposure_time: f64,
    /// Number of visits; must be at least 1.
    #[serde(default = "default_exposure_counts")]
    pub exposure_counts: f64,
    /// Monitoring cadence in days.
    #[serde(default = "default_monitoring_freq")]
    pub monitoring_freq: i64,
    #[serde(default)]
    pub opt_mag: Option<f64>,
    #[serde(default)]
    pub opt_filt: Option<String>,
    #[serde(default = "default_xrt_countrate")]
    pub xrt_countrate: f64,
    /// Urgency class, submitted as a string `"1"`..`"4"`.
    #[serde(default = "default_urgency")]
    pub urgency: String,
    #[serde(default = "default_obs_type")]
    pub obs_type: String,
    #[serde(default = "default_source_type")]
    pub source_type: String,
    #[serde(default = "default_exp_time_just")]
    pub exp_time_just: String,
    #[serde(default = "default_immediate_objective")]
    pub immediate_objective: String,
    /// UVOT mode display label; must match the fixed mode table.
    #[serde(default = "default_uvot_mode")]
    pub uvot_mode: String,
    #[serde(default = "default_science_just")]
    pub science_just: String,
    /// Required whenever `uvot_mode` is not the default mode.
    #[serde(default)]
    pub uvot_just: Option<String>,
}

impl Default for TooForm {
    fn default() -> Self {
        Self {
            exposure_time: default_exposure_time(),
            exposure_counts: default_exposure_counts(),
            monitoring_freq: default_monitoring_freq(),
            opt_mag: None,
            opt_filt: None,
            xrt_countrate: default_xrt_countrate(),
            urgency: default_urgency(),
            obs_type: default_obs_type(),
            source_type: default_source_type(),
            exp_time_just: default_exp_time_just(),
            immediate_objective: default_immediate_objective(),
            uvot_mode: default_uvot_mode(),
            science_just: default_science_just(),
            uvot_just: None,
        }
    }
}

fn default_cent_meth() -> String {
    "simple".to_string()
}

fn default_det_meth() -> String {
    "simple".to_string()
}

fn default_t0() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

fn default_poserr() -> f64 {
    1.0
}

fn default_bin_meth() -> String {
    "counts".to_string()
}

/// Form fields for an `"XRT API"` analysis-job request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrtJobForm {
    /// Whether to centroid on the source.
    #[serde(default)]
    pub detornot: bool,
    /// Centroid method: `simple` or `iterative`.
    #[serde(rename = "centMeth", default = "default_cent_meth")]
    pub cent_meth: String,
    /// Detection method: `simple` or `iterative`.
    #[serde(rename = "detMeth", default = "default_det_meth")]
    pub det_meth: String,
    /// Reference epoch as a UT timestamp string.
    #[serde(rename = "T0", default = "default_t0")]
    pub t0: String,
    /// Position error in arcmin.
    #[serde(default = "default_poserr")]
    pub poserr: f64,
    /// Light-curve binning: counts, time, snapshot or obsid.
    #[serde(rename = "binMeth", default = "default_bin_meth")]
    pub bin_meth: String,
}

impl Default for XrtJobForm {
    fn default() -> Self {
        Self {
            detornot: false,
            cent_meth: default_cent_meth(),
            det_meth: default_det_meth(),
            t0: default_t0(),
            poserr: default_poserr(),
            bin_meth: default_bin_meth(),
        }
    }
}

fn default_start_date() -> String {
    (Utc::now() - Duration::days(365))
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}

fn default_end_date() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

/// Form fields for an `"XRT/UVOT/BAT Data"` archive query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQueryForm {
    /// Window start as a UT timestamp string. Defaults to one year ago.
    #[serde(default = "default_start_date")]
    pub start_date: String,
    /// Window end as a UT timestamp string. Defaults to now.
    #[serde(default = "default_end_date")]
    pub end_date: String,
    /// Whether to retrieve XRT data.
    #[serde(rename = "XRT", default)]
    pub xrt: bool,
    /// Whether to retrieve UVOT data.
    #[serde(rename = "UVOT", default)]
    pub uvot: bool,
    /// Whether to retrieve BAT data.
    #[serde(rename = "BAT", default)]
    pub bat: bool,
}

impl Default for DataQueryForm {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            end_date: default_end_date(),
            xrt: false,
            uvot: false,
            bat: false,
        }
    }
}

/// Parse a UT timestamp as submitted by the platform form.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` with optional fractional seconds, the
/// `T`-separated equivalent, and RFC 3339.
pub fn parse_ut_timestamp(s: &str) -> Option<DateTime<Utc>> {
    use chrono::NaiveDateTime;

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}
