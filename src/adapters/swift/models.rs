//! Wire-format payloads and responses for the Swift services.
//!
//! These are the facility-facing shapes: the signed ToO submission, the
//! XRT product-build job dict, the observation archive query and its
//! result rows, and the per-obsid data manifests.

use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{FacilityError, FacilityResult};

use super::uvot;

/// A fully built ToO request, ready to be signed and submitted.
///
/// Field names follow the facility's submission schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TooPayload {
    pub username: String,
    pub source_name: String,
    pub ra: f64,
    pub dec: f64,
    pub source_type: String,
    pub exp_time_per_visit: f64,
    /// Cadence rendered as e.g. `"1 days"`, as the facility expects.
    pub monitoring_freq: String,
    pub num_of_visits: i64,
    pub opt_mag: Option<f64>,
    pub opt_filt: Option<String>,
    pub xrt_countrate: Option<f64>,
    pub exp_time_just: String,
    pub immediate_objective: String,
    pub urgency: i64,
    pub obs_type: String,
    /// Hex mode code resolved from the display label.
    pub uvot_mode: String,
    pub science_just: String,
    pub uvot_just: Option<String>,
}

impl TooPayload {
    /// Facility-side semantic validation, run just before submission.
    ///
    /// The request builder has already checked form-level constraints;
    /// this re-checks what the facility itself would bounce.
    pub fn validate(&self) -> FacilityResult<()> {
        if self.source_name.is_empty() {
            return Err(FacilityError::Validation("source_name must not be empty".to_string()));
        }
        if self.exp_time_per_visit <= 0.0 {
            return Err(FacilityError::Validation(
                "exp_time_per_visit must be positive".to_string(),
            ));
        }
        if self.num_of_visits < 1 {
            return Err(FacilityError::Validation(
                "num_of_visits must be at least 1".to_string(),
            ));
        }
        if !(0..=4).contains(&self.urgency) {
            return Err(FacilityError::Validation(format!(
                "urgency must be one of 0, 1, 2, 3, or 4, and not: {}",
                self.urgency
            )));
        }
        if self.science_just.is_empty() || self.exp_time_just.is_empty() {
            return Err(FacilityError::Validation(
                "science_just and exp_time_just must not be empty".to_string(),
            ));
        }
        if uvot::label_for_code(&self.uvot_mode).is_none() {
            return Err(FacilityError::Validation(format!(
                "unknown UVOT mode code: {}",
                self.uvot_mode
            )));
        }
        Ok(())
    }

    /// Sign the payload into the submission token (HS256 over the shared
    /// secret). The facility unpacks the claims server-side.
    pub fn signed_token(&self, secret: &str) -> FacilityResult<String> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| FacilityError::Serialization(format!("Failed to sign ToO token: {e}")))
    }
}

/// Light-curve section of an XRT product-build job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrtLightCurvePars {
    #[serde(rename = "binMeth")]
    pub bin_meth: String,
    #[serde(rename = "pcCounts")]
    pub pc_counts: i64,
    #[serde(rename = "wtCounts")]
    pub wt_counts: i64,
    pub dynamic: bool,
}

/// Spectrum section of an XRT product-build job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrtSpectrumPars {
    #[serde(rename = "hasRedshift")]
    pub has_redshift: bool,
}

/// Astrometric-position section of an XRT product-build job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrtAstromPosPars {
    #[serde(rename = "useAllObs")]
    pub use_all_obs: bool,
}

/// An XRT product-build job, serialized verbatim as the job dict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrtJobPayload {
    #[serde(rename = "UserID")]
    pub user_id: String,
    pub name: String,
    #[serde(rename = "RA")]
    pub ra: f64,
    #[serde(rename = "Dec")]
    pub dec: f64,
    pub centroid: bool,
    #[serde(rename = "centMeth")]
    pub cent_meth: String,
    #[serde(rename = "detMeth")]
    pub det_meth: String,
    #[serde(rename = "useSXPS")]
    pub use_sxps: bool,
    #[serde(rename = "getTargs")]
    pub get_targs: bool,
    /// Seconds since the Swift mission epoch (2001-01-01 00:00:00 UTC).
    #[serde(rename = "T0")]
    pub t0: f64,
    #[serde(rename = "posErr")]
    pub pos_err: f64,
    pub lc: XrtLightCurvePars,
    pub spec: XrtSpectrumPars,
    #[serde(rename = "psf")]
    pub standard_pos: bool,
    #[serde(rename = "enh")]
    pub enhanced_pos: bool,
    pub astrom: XrtAstromPosPars,
}

impl XrtJobPayload {
    /// The JSON job dict submitted to the product-build endpoint.
    pub fn to_json_dict(&self) -> FacilityResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Response body of an XRT job submission, also re-parsed later from the
/// stored facility transaction when fetching results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrtJobStatus {
    #[serde(rename = "OK")]
    pub ok: i64,
    #[serde(rename = "JobID", default)]
    pub job_id: Option<i64>,
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
    #[serde(rename = "jobPars", default)]
    pub job_pars: Option<serde_json::Value>,
    #[serde(rename = "ERROR", default)]
    pub error: Option<String>,
    #[serde(rename = "listErr", default)]
    pub list_err: Option<serde_json::Value>,
}

impl XrtJobStatus {
    /// Whether the facility accepted the job.
    pub fn accepted(&self) -> bool {
        self.ok != 0
    }

    /// The facility's rejection text: `<ERROR>, <listErr>`.
    pub fn rejection_reason(&self) -> String {
        let error = self.error.as_deref().unwrap_or("unknown error");
        let list_err = self
            .list_err
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "[]".to_string());
        format!("{error}, {list_err}")
    }
}

/// One downloadable product of a completed XRT job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrtProduct {
    pub name: String,
    pub url: String,
    pub filename: String,
}

/// Observation archive query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObsQueryParams {
    /// Cone center RA in degrees; absent for whole-sky window queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ra: Option<f64>,
    /// Cone center Dec in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dec: Option<f64>,
    /// Cone radius in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Window start, UT.
    pub begin: String,
    /// Window end, UT.
    pub end: String,
}

/// One raw row from the observation archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveRow {
    /// Observation identifier, a zero-padded decimal string.
    pub obsid: String,
    /// Observation start, UT.
    pub begin: String,
    pub ra_object: Option<f64>,
    pub dec_object: Option<f64>,
    /// Total exposure in seconds.
    pub exposure: f64,
    /// UVOT mode hex code flown for this observation.
    pub uvot: String,
    pub targname: String,
}

/// One filter entry of a decoded UVOT mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UvotModeEntry {
    pub filter_name: String,
}

/// Archive response decoding a UVOT mode into its filter entries.
///
/// `entries` is `None` when the mode is unknown to the archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UvotModeResponse {
    pub entries: Option<Vec<UvotModeEntry>>,
}

/// One downloadable file of an observation's data bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEntry {
    /// Directory path relative to the obsid root.
    pub path: String,
    pub filename: String,
    pub url: String,
}

/// Data-request manifest for one obsid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataManifest {
    /// Whether the facility accepted the data request.
    pub ok: bool,
    #[serde(default)]
    pub entries: Vec<DataEntry>,
}
