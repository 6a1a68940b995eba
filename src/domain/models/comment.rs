//! Platform comment model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A comment posted back onto a platform object, optionally carrying a
/// base64-encoded binary attachment. Insert-only; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub obj_id: String,
    pub attachment_name: Option<String>,
    /// Base64-encoded attachment payload.
    pub attachment_bytes: Option<String>,
    pub author_id: Uuid,
    /// Groups the comment is visible to.
    pub group_ids: Vec<Uuid>,
    /// Whether the comment was authored by automation.
    pub bot: bool,
}

impl Comment {
    /// Build a comment with a base64-encoded attachment.
    pub fn with_attachment(
        text: impl Into<String>,
        obj_id: impl Into<String>,
        attachment_name: impl Into<String>,
        attachment_bytes: String,
        author_id: Uuid,
        group_ids: Vec<Uuid>,
        bot: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            obj_id: obj_id.into(),
            attachment_name: Some(attachment_name.into()),
            attachment_bytes: Some(attachment_bytes),
            author_id,
            group_ids,
            bot,
        }
    }
}
