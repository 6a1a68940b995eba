//! Allocation and credential models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{FacilityError, FacilityResult};

/// A platform allocation granting access to the Swift facility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub id: Uuid,
    /// The instrument whose observation log backfills target.
    pub instrument_id: Uuid,
    /// Groups result comments are shared with.
    #[serde(default)]
    pub group_ids: Vec<Uuid>,
    /// Credential bundle; `None` means the allocation was never configured.
    pub altdata: Option<AllocationCredentials>,
}

impl Allocation {
    /// The credential bundle, or `MissingCredentials` if absent.
    ///
    /// Every adapter operation calls this before doing anything else.
    pub fn credentials(&self) -> FacilityResult<&AllocationCredentials> {
        self.altdata.as_ref().ok_or(FacilityError::MissingCredentials)
    }
}

/// Per-allocation Swift credentials and notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationCredentials {
    /// ToO account username.
    pub username: String,
    /// ToO shared secret; signs the submission token.
    pub secret: String,
    /// XRT product-build account identifier.
    #[serde(rename = "XRT_UserID")]
    pub xrt_user_id: String,
    /// How to notify the requesting user about submissions.
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Notification channel configured on an allocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "notification_type", rename_all = "lowercase")]
pub enum NotificationConfig {
    #[default]
    None,
    Slack {
        slack_workspace: String,
        slack_channel: String,
        slack_token: String,
        #[serde(default)]
        include_comments: bool,
    },
    Email {
        email: String,
        #[serde(default)]
        include_comments: bool,
    },
}
