//! Best-effort submission notifications.
//!
//! Consumes the allocation's notification settings and pushes a short
//! summary to Slack or an email relay. The contract is strictly
//! best-effort: callers log a returned error and move on; a notification
//! failure never affects request status or transaction persistence.

use reqwest::Client;

use crate::domain::errors::{FacilityError, FacilityResult};
use crate::domain::models::{FollowupRequest, NotificationConfig};

const SLACK_WEBHOOK_BASE: &str = "https://hooks.slack.com/services";

/// Dispatches submission notices per the allocation's configuration.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    http: Client,
    slack_base_url: String,
    email_endpoint: Option<String>,
}

impl NotificationDispatcher {
    pub fn new(email_endpoint: Option<String>) -> Self {
        Self {
            http: Client::new(),
            slack_base_url: SLACK_WEBHOOK_BASE.to_string(),
            email_endpoint,
        }
    }

    /// Point Slack webhooks at a different base URL (tests).
    pub fn with_slack_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.slack_base_url = base_url.into();
        self
    }

    /// Summary line sent through either channel.
    fn summary(request: &FollowupRequest, status: &str, include_comments: bool) -> String {
        let mut text = format!(
            "Swift {} request for {}: {}",
            request.payload.request_type(),
            request.obj.id,
            status,
        );
        if include_comments {
            text.push_str(" (results will be posted as comments)");
        }
        text
    }

    /// Send the configured notification for a just-submitted request.
    ///
    /// `status` is the outcome just committed for the request; the
    /// in-memory record may still carry the pre-submission status.
    /// `NotificationConfig::None` is a successful no-op.
    pub async fn dispatch(&self, request: &FollowupRequest, status: &str) -> FacilityResult<()> {
        let creds = request.allocation.credentials()?;
        match &creds.notification {
            NotificationConfig::None => Ok(()),
            NotificationConfig::Slack {
                slack_workspace,
                slack_channel,
                slack_token,
                include_comments,
            } => {
                let url = format!(
                    "{}/{slack_workspace}/{slack_channel}/{slack_token}",
                    self.slack_base_url
                );
                let body = serde_json::json!({
                    "text": Self::summary(request, status, *include_comments),
                });
                let resp = self
                    .http
                    .post(&url)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| FacilityError::Http(format!("Slack notification failed: {e}")))?;
                if !resp.status().is_success() {
                    return Err(FacilityError::Http(format!(
                        "Slack notification returned {}",
                        resp.status().as_u16()
                    )));
                }
                Ok(())
            }
            NotificationConfig::Email { email, include_comments } => {
                let endpoint = self.email_endpoint.as_deref().ok_or_else(|| {
                    FacilityError::Http(
                        "email notification requested but no email relay is configured"
                            .to_string(),
                    )
                })?;
                let body = serde_json::json!({
                    "to": email,
                    "subject": format!("Swift request update: {}", request.obj.id),
                    "body": Self::summary(request, status, *include_comments),
                });
                let resp = self
                    .http
                    .post(endpoint)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| FacilityError::Http(format!("Email notification failed: {e}")))?;
                if !resp.status().is_success() {
                    return Err(FacilityError::Http(format!(
                        "Email notification returned {}",
                        resp.status().as_u16()
                    )));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        Allocation, AllocationCredentials, RequestPayload, Target, TooForm,
    };
    use uuid::Uuid;

    fn request_with_notification(notification: NotificationConfig) -> FollowupRequest {
        FollowupRequest {
            id: Uuid::new_v4(),
            obj: Target {
                id: "ZTF24abcdef".to_string(),
                ra: 150.1,
                dec: -20.5,
                internal_key: "obj-key".to_string(),
            },
            allocation: Allocation {
                id: Uuid::new_v4(),
                instrument_id: Uuid::new_v4(),
                group_ids: vec![],
                altdata: Some(AllocationCredentials {
                    username: "observer".to_string(),
                    secret: "hunter2".to_string(),
                    xrt_user_id: "xrt-42".to_string(),
                    notification,
                }),
            },
            payload: RequestPayload::Too(TooForm::default()),
            status: "submitted".to_string(),
            last_modified_by: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_none_config_is_a_noop() {
        let dispatcher = NotificationDispatcher::new(None);
        let request = request_with_notification(NotificationConfig::None);
        assert!(dispatcher.dispatch(&request, "submitted").await.is_ok());
    }

    #[tokio::test]
    async fn test_email_without_relay_errors_without_sending() {
        let dispatcher = NotificationDispatcher::new(None);
        let request = request_with_notification(NotificationConfig::Email {
            email: "observer@example.org".to_string(),
            include_comments: false,
        });
        assert!(matches!(
            dispatcher.dispatch(&request, "submitted").await,
            Err(FacilityError::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_slack_webhook_posts_summary() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/ws/ch/tok")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"text": "Swift XRT/UVOT ToO request for ZTF24abcdef: submitted"}"#.to_string(),
            ))
            .with_status(200)
            .create_async()
            .await;

        let dispatcher =
            NotificationDispatcher::new(None).with_slack_base_url(server.url());
        let request = request_with_notification(NotificationConfig::Slack {
            slack_workspace: "ws".to_string(),
            slack_channel: "ch".to_string(),
            slack_token: "tok".to_string(),
            include_comments: false,
        });
        dispatcher.dispatch(&request, "submitted").await.unwrap();
        mock.assert_async().await;
    }
}
