//! Platform signal bus port.
//!
//! The follow-up platform exposes a message flow that refreshes source
//! pages and request lists and surfaces toast notifications. This adapter
//! only pushes into it; the transport is a black-box collaborator.

use async_trait::async_trait;
use uuid::Uuid;

/// Outbound platform signals. All methods are best-effort: implementations
/// must not fail the calling operation.
#[async_trait]
pub trait PlatformBus: Send + Sync {
    /// Ask every session viewing the object to refresh it.
    async fn refresh_source(&self, obj_key: &str);

    /// Ask one user's session to refresh its follow-up request list.
    async fn refresh_requests(&self, user_id: Uuid);

    /// Surface a toast notification to one user.
    async fn show_notification(&self, user_id: Uuid, note: &str, level: &str);
}

/// Bus implementation that only logs; used when the platform flow is not
/// wired up (tests, offline tooling).
#[derive(Debug, Default, Clone)]
pub struct NullPlatformBus;

#[async_trait]
impl PlatformBus for NullPlatformBus {
    async fn refresh_source(&self, obj_key: &str) {
        tracing::debug!(obj_key, "refresh_source signal dropped (null bus)");
    }

    async fn refresh_requests(&self, user_id: Uuid) {
        tracing::debug!(%user_id, "refresh_requests signal dropped (null bus)");
    }

    async fn show_notification(&self, user_id: Uuid, note: &str, level: &str) {
        tracing::debug!(%user_id, note, level, "notification dropped (null bus)");
    }
}
