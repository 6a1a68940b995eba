//! Translation of follow-up requests into facility payloads.
//!
//! Pure functions: the only side effect is a validation error. Each
//! request type maps to one facility payload shape; routing happens on
//! the payload variant, not on strings.

use chrono::{TimeZone, Utc};

use crate::adapters::swift::models::{
    ObsQueryParams, TooPayload, XrtAstromPosPars, XrtJobPayload, XrtLightCurvePars,
    XrtSpectrumPars,
};
use crate::adapters::swift::uvot;
use crate::domain::errors::{FacilityError, FacilityResult};
use crate::domain::models::request::parse_ut_timestamp;
use crate::domain::models::{DataQueryForm, FollowupRequest, RequestPayload, TooForm, XrtJobForm};

/// Observation types the ToO service accepts.
const ALLOWED_OBS_TYPES: [&str; 4] = ["Spectroscopy", "Light Curve", "Position", "Timing"];

/// Cone-search radius for data queries, in degrees (5 arcmin).
const DATA_QUERY_RADIUS_DEG: f64 = 5.0 / 60.0;

/// A facility payload built from a follow-up request.
#[derive(Debug, Clone)]
pub enum FacilityPayload {
    Too(TooPayload),
    XrtJob(XrtJobPayload),
    DataQuery(ObsQueryParams),
}

/// Build the facility payload for a follow-up request.
///
/// Fails with [`FacilityError::MissingCredentials`] when the allocation
/// is unconfigured and [`FacilityError::Validation`] on malformed fields.
pub fn build(request: &FollowupRequest) -> FacilityResult<FacilityPayload> {
    let creds = request.allocation.credentials()?;
    match &request.payload {
        RequestPayload::Too(form) => {
            build_too(request, &creds.username, form).map(FacilityPayload::Too)
        }
        RequestPayload::XrtJob(form) => {
            build_xrt_job(request, &creds.xrt_user_id, form).map(FacilityPayload::XrtJob)
        }
        RequestPayload::DataQuery(form) => build_data_query(request, form).map(FacilityPayload::DataQuery),
    }
}

fn build_too(request: &FollowupRequest, username: &str, form: &TooForm) -> FacilityResult<TooPayload> {
    let urgency: i64 = form.urgency.trim().parse().map_err(|e| {
        FacilityError::Validation(format!("Could not convert urgency to a valid integer: {e}"))
    })?;
    if !(0..=4).contains(&urgency) {
        return Err(FacilityError::Validation(format!(
            "urgency must be one of 0, 1, 2, 3, or 4, and not: {urgency}"
        )));
    }

    if !ALLOWED_OBS_TYPES.contains(&form.obs_type.as_str()) {
        return Err(FacilityError::Validation(
            "obs_type not an allowed value.".to_string(),
        ));
    }

    let mode_code = uvot::code_for_label(&form.uvot_mode).ok_or_else(|| {
        FacilityError::Validation(format!("unknown UVOT mode: {}", form.uvot_mode))
    })?;

    let uvot_just = if mode_code == uvot::DEFAULT_MODE {
        form.uvot_just.clone()
    } else {
        match form.uvot_just.as_deref() {
            Some(just) if !just.is_empty() => Some(just.to_string()),
            _ => {
                return Err(FacilityError::Validation(
                    "uvot_just is required when the UVOT mode is not the default mode."
                        .to_string(),
                ))
            }
        }
    };

    #[allow(clippy::cast_possible_truncation)]
    let num_of_visits = form.exposure_counts as i64;
    if num_of_visits < 1 {
        return Err(FacilityError::Validation(
            "exposure_counts must be at least 1".to_string(),
        ));
    }

    Ok(TooPayload {
        username: username.to_string(),
        source_name: request.obj.id.clone(),
        ra: request.obj.ra,
        dec: request.obj.dec,
        source_type: form.source_type.clone(),
        exp_time_per_visit: form.exposure_time,
        monitoring_freq: format!("{} days", form.monitoring_freq),
        num_of_visits,
        opt_mag: form.opt_mag,
        opt_filt: form.opt_filt.clone(),
        xrt_countrate: Some(form.xrt_countrate),
        exp_time_just: form.exp_time_just.clone(),
        immediate_objective: form.immediate_objective.clone(),
        urgency,
        obs_type: form.obs_type.clone(),
        uvot_mode: mode_code.to_string(),
        science_just: form.science_just.clone(),
        uvot_just,
    })
}

/// Seconds between a UT timestamp and the Swift mission epoch
/// (2001-01-01 00:00:00 UTC), the facility's internal clock convention.
pub fn mission_elapsed_seconds(t0: &str) -> FacilityResult<f64> {
    let t0 = parse_ut_timestamp(t0).ok_or_else(|| {
        FacilityError::Validation(format!("Could not parse T0 as a timestamp: {t0}"))
    })?;
    let met_epoch = Utc
        .with_ymd_and_hms(2001, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| FacilityError::Validation("invalid mission epoch".to_string()))?;
    #[allow(clippy::cast_precision_loss)]
    Ok((t0 - met_epoch).num_milliseconds() as f64 / 1000.0)
}

fn build_xrt_job(
    request: &FollowupRequest,
    xrt_user_id: &str,
    form: &XrtJobForm,
) -> FacilityResult<XrtJobPayload> {
    let t0 = mission_elapsed_seconds(&form.t0)?;

    Ok(XrtJobPayload {
        user_id: xrt_user_id.to_string(),
        name: request.obj.id.clone(),
        ra: request.obj.ra,
        dec: request.obj.dec,
        centroid: form.detornot,
        cent_meth: form.cent_meth.clone(),
        det_meth: form.det_meth.clone(),
        use_sxps: false,
        get_targs: true,
        t0,
        pos_err: form.poserr,
        lc: XrtLightCurvePars {
            bin_meth: "counts".to_string(),
            pc_counts: 20,
            wt_counts: 30,
            dynamic: true,
        },
        spec: XrtSpectrumPars { has_redshift: false },
        standard_pos: true,
        enhanced_pos: true,
        astrom: XrtAstromPosPars { use_all_obs: true },
    })
}

fn build_data_query(
    request: &FollowupRequest,
    form: &DataQueryForm,
) -> FacilityResult<ObsQueryParams> {
    // Timestamps must parse; window ordering is deliberately not checked
    // here (the backfill path enforces it, this path never has).
    let begin = parse_ut_timestamp(&form.start_date).ok_or_else(|| {
        FacilityError::Validation(format!("Could not parse start_date: {}", form.start_date))
    })?;
    let end = parse_ut_timestamp(&form.end_date).ok_or_else(|| {
        FacilityError::Validation(format!("Could not parse end_date: {}", form.end_date))
    })?;

    Ok(ObsQueryParams {
        ra: Some(request.obj.ra),
        dec: Some(request.obj.dec),
        radius: Some(DATA_QUERY_RADIUS_DEG),
        begin: begin.format("%Y-%m-%d %H:%M:%S").to_string(),
        end: end.format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}
