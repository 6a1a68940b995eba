//! HTTP client for the Swift facility services.
//!
//! Thin typed wrapper over the ToO submission endpoint, the XRT
//! product-build service and the observation archive. Submission calls
//! return raw request/response snapshots so the submitter can both
//! interpret the outcome and persist the audit transaction; query calls
//! deserialize directly into the wire models.

use std::path::Path;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::domain::errors::{FacilityError, FacilityResult};
use crate::domain::models::config::Config;
use crate::domain::models::{HttpRequestRecord, HttpResponseRecord};

use super::models::{
    ArchiveRow, DataManifest, ObsQueryParams, UvotModeEntry, UvotModeResponse, XrtProduct,
};

#[derive(Debug, Deserialize)]
struct XrtJobCompleteResponse {
    complete: bool,
}

/// Client for all outbound Swift traffic.
///
/// No retries and no timeouts beyond reqwest defaults; the adapter's
/// callers treat every call as a single attempt.
#[derive(Debug, Clone)]
pub struct SwiftClient {
    http: Client,
    too_submit_url: String,
    xrt_base_url: String,
    archive_base_url: String,
}

impl SwiftClient {
    /// Build a client from the adapter configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            too_submit_url: config.too_submit_url(),
            xrt_base_url: config.xrt_endpoint.clone(),
            archive_base_url: config.archive_endpoint.clone(),
        }
    }

    /// Submit a signed ToO token as form data.
    ///
    /// Non-2xx responses are not an error here: the submitter decides how
    /// to record them. Only transport failures return `Err`.
    pub async fn submit_too(
        &self,
        jwt: &str,
    ) -> FacilityResult<(HttpRequestRecord, HttpResponseRecord)> {
        let form = [("jwt", jwt)];
        let resp = self
            .http
            .post(&self.too_submit_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| FacilityError::Http(format!("ToO submission failed: {e}")))?;

        let status = resp.status().as_u16();
        let content = resp.text().await.unwrap_or_default();
        Ok((
            HttpRequestRecord {
                method: "POST".to_string(),
                url: self.too_submit_url.clone(),
                body: format!("jwt={jwt}"),
            },
            HttpResponseRecord { status, content },
        ))
    }

    /// Submit an XRT product-build job dict as JSON.
    pub async fn submit_xrt_job(
        &self,
        job_dict: &serde_json::Value,
    ) -> FacilityResult<(HttpRequestRecord, HttpResponseRecord)> {
        let url = format!("{}/run_userobject.php", self.xrt_base_url);
        let resp = self
            .http
            .post(&url)
            .json(job_dict)
            .send()
            .await
            .map_err(|e| FacilityError::Http(format!("XRT job submission failed: {e}")))?;

        let status = resp.status().as_u16();
        let content = resp.text().await.unwrap_or_default();
        Ok((
            HttpRequestRecord {
                method: "POST".to_string(),
                url,
                body: job_dict.to_string(),
            },
            HttpResponseRecord { status, content },
        ))
    }

    /// The canonical reason phrase for an HTTP status code.
    pub fn reason_phrase(status: u16) -> &'static str {
        StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
    }

    /// Query the observation archive.
    pub async fn query_observations(
        &self,
        params: &ObsQueryParams,
    ) -> FacilityResult<Vec<ArchiveRow>> {
        let url = format!("{}/obsquery", self.archive_base_url);
        let resp = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| FacilityError::Http(format!("Observation query failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FacilityError::Http(format!(
                "Observation query returned {status}: {body}"
            )));
        }

        resp.json::<Vec<ArchiveRow>>()
            .await
            .map_err(|e| FacilityError::Http(format!("Observation query parse failed: {e}")))
    }

    /// Decode a UVOT mode into its filter entries.
    ///
    /// Returns `None` when the archive does not know the mode.
    pub async fn uvot_mode_entries(
        &self,
        mode: &str,
    ) -> FacilityResult<Option<Vec<UvotModeEntry>>> {
        let url = format!("{}/uvot_mode", self.archive_base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("mode", mode)])
            .send()
            .await
            .map_err(|e| FacilityError::Http(format!("UVOT mode decode failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(FacilityError::Http(format!(
                "UVOT mode decode returned {status}"
            )));
        }

        let decoded = resp
            .json::<UvotModeResponse>()
            .await
            .map_err(|e| FacilityError::Http(format!("UVOT mode parse failed: {e}")))?;
        Ok(decoded.entries)
    }

    /// Whether a previously accepted XRT job has built all its products.
    pub async fn xrt_job_complete(&self, job_id: i64) -> FacilityResult<bool> {
        let url = format!("{}/job_status.php", self.xrt_base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("jobid", job_id)])
            .send()
            .await
            .map_err(|e| FacilityError::Http(format!("XRT job status failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(FacilityError::Http(format!(
                "XRT job status returned {status}"
            )));
        }

        let parsed = resp
            .json::<XrtJobCompleteResponse>()
            .await
            .map_err(|e| FacilityError::Http(format!("XRT job status parse failed: {e}")))?;
        Ok(parsed.complete)
    }

    /// List the downloadable products of a completed XRT job.
    pub async fn xrt_products(&self, job_id: i64) -> FacilityResult<Vec<XrtProduct>> {
        let url = format!("{}/list_products.php", self.xrt_base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("jobid", job_id)])
            .send()
            .await
            .map_err(|e| FacilityError::Http(format!("XRT product listing failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(FacilityError::Http(format!(
                "XRT product listing returned {status}"
            )));
        }

        resp.json::<Vec<XrtProduct>>()
            .await
            .map_err(|e| FacilityError::Http(format!("XRT product listing parse failed: {e}")))
    }

    /// Request the data manifest for one obsid, filtered by instrument.
    pub async fn data_manifest(
        &self,
        obsid: &str,
        xrt: bool,
        uvot: bool,
        bat: bool,
    ) -> FacilityResult<DataManifest> {
        let url = format!("{}/data", self.archive_base_url);
        let body = serde_json::json!({
            "obsid": obsid,
            "xrt": xrt,
            "uvot": uvot,
            "bat": bat,
        });
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FacilityError::Http(format!("Data request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FacilityError::Http(format!(
                "Data request returned {status}: {body}"
            )));
        }

        resp.json::<DataManifest>()
            .await
            .map_err(|e| FacilityError::Http(format!("Data manifest parse failed: {e}")))
    }

    /// Download one file to a destination path.
    ///
    /// A non-2xx response is a [`FacilityError::Download`]: on the data
    /// path a single failed file aborts the whole batch.
    pub async fn download_file(&self, url: &str, dest: &Path) -> FacilityResult<()> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FacilityError::Download(format!("{url}: {e}")))?;

        if !resp.status().is_success() {
            return Err(FacilityError::Download(format!(
                "{url}: HTTP {}",
                resp.status().as_u16()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| FacilityError::Download(format!("{url}: {e}")))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &bytes).await?;
        Ok(())
    }
}
