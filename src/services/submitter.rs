//! Follow-up request submission.
//!
//! One outbound HTTP call per submission, one audit transaction per ToO
//! or XRT-job submission, and a status string that records the outcome.
//! A facility rejection is not an error of this service: it is recorded
//! on the request and reported to the user, and `submit` still returns
//! `Ok`.

use std::sync::Arc;

use crate::adapters::swift::models::XrtJobStatus;
use crate::adapters::swift::SwiftClient;
use crate::domain::errors::FacilityResult;
use crate::domain::models::{FacilityTransaction, FollowupRequest};
use crate::domain::ports::{FollowupRepository, PlatformBus};

use super::notifications::NotificationDispatcher;
use super::request_builder::{self, FacilityPayload};

/// Platform refresh signals requested by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitOptions {
    /// Refresh the object's source page for all viewers.
    pub refresh_source: bool,
    /// Refresh the submitter's follow-up request list.
    pub refresh_requests: bool,
}

/// Submits follow-up requests to the Swift facility.
pub struct Submitter {
    client: SwiftClient,
    repo: Arc<dyn FollowupRepository>,
    bus: Arc<dyn PlatformBus>,
    notifier: NotificationDispatcher,
}

impl Submitter {
    pub fn new(
        client: SwiftClient,
        repo: Arc<dyn FollowupRepository>,
        bus: Arc<dyn PlatformBus>,
        notifier: NotificationDispatcher,
    ) -> Self {
        Self { client, repo, bus, notifier }
    }

    /// Submit a follow-up request, routing on its payload type.
    ///
    /// Validation and credential errors propagate; facility rejections
    /// are recorded as a `rejected:` status and do not error.
    pub async fn submit(
        &self,
        request: &FollowupRequest,
        opts: SubmitOptions,
    ) -> FacilityResult<()> {
        let creds = request.allocation.credentials()?;
        let payload = request_builder::build(request)?;

        let status = match payload {
            FacilityPayload::Too(too) => {
                too.validate()?;
                let token = too.signed_token(&creds.secret)?;
                let (req_rec, resp_rec) = self.client.submit_too(&token).await?;

                let status = if resp_rec.status == 200 {
                    "submitted".to_string()
                } else {
                    tracing::error!(
                        request_id = %request.id,
                        obj_id = %request.obj.id,
                        http_status = resp_rec.status,
                        body = %resp_rec.content,
                        "Failed to submit Swift ToO request"
                    );
                    format!("rejected: {}", resp_rec.content)
                };
                let rejection_body =
                    (resp_rec.status != 200).then(|| resp_rec.content.clone());

                let transaction = FacilityTransaction::new(
                    request.id,
                    request.last_modified_by,
                    req_rec,
                    resp_rec,
                );
                self.repo
                    .record_submission(request.id, &status, &transaction)
                    .await?;

                if let Some(body) = rejection_body {
                    self.bus
                        .show_notification(
                            request.last_modified_by,
                            &format!("Failed to submit Swift request: {body}"),
                            "error",
                        )
                        .await;
                }
                status
            }

            FacilityPayload::XrtJob(job) => {
                let dict = job.to_json_dict()?;
                let (req_rec, resp_rec) = self.client.submit_xrt_job(&dict).await?;

                let status = if resp_rec.status != 200 {
                    format!("rejected: {}", SwiftClient::reason_phrase(resp_rec.status))
                } else {
                    let parsed: XrtJobStatus = serde_json::from_str(&resp_rec.content)?;
                    if parsed.accepted() {
                        "submitted".to_string()
                    } else {
                        format!("rejected: {}", parsed.rejection_reason())
                    }
                };

                let transaction = FacilityTransaction::new(
                    request.id,
                    request.last_modified_by,
                    req_rec,
                    resp_rec,
                );
                self.repo
                    .record_submission(request.id, &status, &transaction)
                    .await?;
                status
            }

            FacilityPayload::DataQuery(params) => {
                // No facility submission and no transaction: the status
                // reflects only the locally computed observation count.
                let rows = self.client.query_observations(&params).await?;
                let status = format!("Number of observations: {}", rows.len());
                self.repo.update_status(request.id, &status).await?;
                status
            }
        };

        self.push_signals(request, opts).await;

        if let Err(e) = self.notifier.dispatch(request, &status).await {
            tracing::error!(request_id = %request.id, error = %e, "Error sending notification");
        }

        Ok(())
    }

    async fn push_signals(&self, request: &FollowupRequest, opts: SubmitOptions) {
        if opts.refresh_source {
            self.bus.refresh_source(&request.obj.internal_key).await;
        }
        if opts.refresh_requests {
            self.bus.refresh_requests(request.last_modified_by).await;
        }
    }
}
