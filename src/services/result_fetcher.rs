//! Retrieval of asynchronous facility results.
//!
//! XRT jobs are fetched inline: the stored submission transaction tells
//! us whether the job was accepted, the facility tells us whether its
//! products are built, and anything earlier than that is a recoverable
//! [`FacilityError::ResultNotReady`]. Multi-instrument data queries are
//! handed to the worker pool; their only observable outcome is the
//! comments and status they eventually write.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::adapters::swift::models::{ObsQueryParams, XrtJobStatus};
use crate::adapters::swift::SwiftClient;
use crate::domain::errors::{FacilityError, FacilityResult};
use crate::domain::models::{Comment, DataQueryForm, FollowupRequest, RequestPayload};
use crate::domain::ports::{FollowupRepository, PlatformBus};

use super::request_builder::{self, FacilityPayload};
use super::submitter::SubmitOptions;
use super::worker_pool::WorkerPool;

/// Status written once results have been attached as comments.
const RESULT_POSTED: &str = "Result posted as comment";

/// Fetches completed facility products and republishes them as comments.
pub struct ResultFetcher {
    client: SwiftClient,
    repo: Arc<dyn FollowupRepository>,
    bus: Arc<dyn PlatformBus>,
    pool: WorkerPool,
}

impl ResultFetcher {
    pub fn new(
        client: SwiftClient,
        repo: Arc<dyn FollowupRepository>,
        bus: Arc<dyn PlatformBus>,
        pool: WorkerPool,
    ) -> Self {
        Self { client, repo, bus, pool }
    }

    /// Fetch results for a follow-up request, routing on its payload type.
    ///
    /// ToO requests have no retrievable results; the call is a no-op for
    /// them apart from the requested refresh signals.
    pub async fn get(&self, request: &FollowupRequest, opts: SubmitOptions) -> FacilityResult<()> {
        request.allocation.credentials()?;

        match &request.payload {
            RequestPayload::XrtJob(_) => self.fetch_xrt_products(request).await?,
            RequestPayload::DataQuery(form) => self.schedule_data_download(request, form)?,
            RequestPayload::Too(_) => {
                tracing::debug!(request_id = %request.id, "ToO requests have no retrievable results");
            }
        }

        if opts.refresh_source {
            self.bus.refresh_source(&request.obj.internal_key).await;
        }
        if opts.refresh_requests {
            self.bus.refresh_requests(request.last_modified_by).await;
        }

        Ok(())
    }

    /// Inline retrieval of a completed XRT product-build job.
    async fn fetch_xrt_products(&self, request: &FollowupRequest) -> FacilityResult<()> {
        let transaction = self
            .repo
            .last_transaction(request.id)
            .await?
            .ok_or_else(|| {
                FacilityError::Validation(
                    "No facility transaction recorded for this request".to_string(),
                )
            })?;

        let stored: XrtJobStatus = serde_json::from_str(&transaction.response.content)?;

        // Rebuilding the payload re-validates the stored form the same way
        // the submission path did.
        let _rebuilt = request_builder::build(request)?;

        if !stored.accepted() {
            return Err(FacilityError::ResultNotReady);
        }
        let job_id = stored.job_id.ok_or_else(|| {
            FacilityError::Validation("Stored facility response carries no JobID".to_string())
        })?;
        if !self.client.xrt_job_complete(job_id).await? {
            return Err(FacilityError::ResultNotReady);
        }

        let tmpdir = tempfile::tempdir()?;
        let products = self.client.xrt_products(job_id).await?;

        let mut comments = Vec::with_capacity(products.len());
        for product in products {
            let dest = tmpdir.path().join(&product.filename);
            self.client.download_file(&product.url, &dest).await?;
            let bytes = tokio::fs::read(&dest).await?;
            comments.push(Comment::with_attachment(
                format!("Swift XRT: {}", product.name),
                &request.obj.id,
                &product.filename,
                BASE64.encode(&bytes),
                request.last_modified_by,
                request.accessible_group_ids(),
                false,
            ));
        }

        self.repo
            .post_results(request.id, RESULT_POSTED, &comments)
            .await?;
        Ok(())
    }

    /// Hand a data-bundle download to the worker pool.
    fn schedule_data_download(
        &self,
        request: &FollowupRequest,
        form: &DataQueryForm,
    ) -> FacilityResult<()> {
        let FacilityPayload::DataQuery(params) = request_builder::build(request)? else {
            return Err(FacilityError::Validation(
                "request payload is not a data query".to_string(),
            ));
        };

        let client = self.client.clone();
        let repo = Arc::clone(&self.repo);
        let request = request.clone();
        let form = form.clone();

        self.pool.spawn("swift-data-download", async move {
            download_observations(&client, repo.as_ref(), &request, &form, &params).await
        });
        Ok(())
    }
}

/// Background task: download every requested instrument's files for each
/// distinct obsid, package per-obsid tarballs, and post one comment per
/// obsid together with the final status.
///
/// Any single download failure aborts the whole batch before anything is
/// committed; the worker pool logs the error.
pub(crate) async fn download_observations(
    client: &SwiftClient,
    repo: &dyn FollowupRepository,
    request: &FollowupRequest,
    form: &DataQueryForm,
    params: &ObsQueryParams,
) -> FacilityResult<()> {
    let rows = client.query_observations(params).await?;

    let mut seen = HashSet::new();
    let obsids: Vec<String> = rows
        .into_iter()
        .map(|row| row.obsid)
        .filter(|obsid| seen.insert(obsid.clone()))
        .collect();

    let tmpdir = tempfile::tempdir()?;
    let mut comments = Vec::new();

    for obsid in obsids {
        let manifest = client
            .data_manifest(&obsid, form.xrt, form.uvot, form.bat)
            .await?;
        if !manifest.ok {
            tracing::warn!(obsid = %obsid, "data request not accepted by the archive, skipping");
            continue;
        }

        let topdir = tmpdir.path().join(&obsid);
        tokio::fs::create_dir_all(&topdir).await?;

        for entry in &manifest.entries {
            let dest = topdir.join(&entry.path).join(&entry.filename);
            client.download_file(&entry.url, &dest).await.map_err(|e| {
                FacilityError::Download(format!("Error downloading {}: {e}", entry.filename))
            })?;
        }

        let tarball_name = format!("{obsid}.tar.gz");
        let tarball = tmpdir.path().join(&tarball_name);
        make_tarball(&topdir, &tarball)?;
        let bytes = tokio::fs::read(&tarball).await?;

        comments.push(Comment::with_attachment(
            format!("Swift Data: {obsid}"),
            &request.obj.id,
            tarball_name,
            BASE64.encode(&bytes),
            request.last_modified_by,
            request.accessible_group_ids(),
            true,
        ));
    }

    repo.post_results(request.id, RESULT_POSTED, &comments)
        .await?;
    Ok(())
}

/// Package a directory as `<name>.tar.gz`, rooted at the directory name.
fn make_tarball(src_dir: &Path, dest: &Path) -> FacilityResult<()> {
    let file = std::fs::File::create(dest)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let arcname = src_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("data");
    builder.append_dir_all(arcname, src_dir)?;
    let encoder = builder
        .into_inner()
        .map_err(|e| FacilityError::Download(format!("tarball assembly failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| FacilityError::Download(format!("gzip finish failed: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_make_tarball_packages_directory_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("00012345001");
        std::fs::create_dir_all(src.join("uvot")).unwrap();
        std::fs::write(src.join("uvot/sw00012345001u.img"), b"image bytes").unwrap();

        let dest = tmp.path().join("00012345001.tar.gz");
        make_tarball(&src, &dest).unwrap();

        let file = std::fs::File::open(&dest).unwrap();
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(
            names.iter().any(|n| n.contains("00012345001")),
            "archive should be rooted at the obsid, got: {names:?}"
        );
        assert!(names.iter().any(|n| n.ends_with("sw00012345001u.img")));
    }

    #[test]
    fn test_tarball_round_trips_file_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("obs");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("data.fits"), b"FITS payload").unwrap();

        let dest = tmp.path().join("obs.tar.gz");
        make_tarball(&src, &dest).unwrap();

        let file = std::fs::File::open(&dest).unwrap();
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        let mut found = false;
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            if entry.path().unwrap().ends_with("data.fits") {
                let mut contents = Vec::new();
                entry.read_to_end(&mut contents).unwrap();
                assert_eq!(contents, b"FITS payload");
                found = true;
            }
        }
        assert!(found);
    }
}
