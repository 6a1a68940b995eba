//! Common test utilities for integration tests
//!
//! Shared fixtures and helpers used across the integration test files:
//! migrated in-memory databases, mockito-backed configuration and a
//! platform bus that records the signals it receives.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use uuid::Uuid;

use swiftlink::adapters::sqlite::{all_migrations, create_test_pool, Migrator};
use swiftlink::domain::models::config::{Config, TooEndpointConfig};
use swiftlink::domain::models::{
    Allocation, AllocationCredentials, FollowupRequest, NotificationConfig, RequestPayload,
    Target,
};
use swiftlink::domain::ports::PlatformBus;

/// Create a migrated in-memory database.
pub async fn setup_test_db() -> SqlitePool {
    let pool = create_test_pool().await.expect("failed to create test pool");
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_migrations())
        .await
        .expect("failed to run migrations");
    pool
}

/// Configuration pointing every facility endpoint at a mockito server.
#[allow(dead_code)]
pub fn config_for(server: &mockito::ServerGuard) -> Config {
    let host_with_port = server.host_with_port();
    let (host, port) = host_with_port
        .rsplit_once(':')
        .expect("mockito address should be host:port");
    Config {
        too: TooEndpointConfig {
            protocol: "http".to_string(),
            host: host.to_string(),
            port: port.parse().expect("mockito port should be numeric"),
        },
        xrt_endpoint: server.url(),
        archive_endpoint: server.url(),
        ..Config::default()
    }
}

/// A follow-up request with working credentials and no notifications.
pub fn test_request(payload: RequestPayload) -> FollowupRequest {
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
            group_ids: vec![Uuid::new_v4()],
            altdata: Some(AllocationCredentials {
                username: "observer".to_string(),
                secret: "hunter2".to_string(),
                xrt_user_id: "xrt-42".to_string(),
                notification: NotificationConfig::None,
            }),
        },
        payload,
        status: "pending submission".to_string(),
        last_modified_by: Uuid::new_v4(),
    }
}

/// Platform bus that records every signal it receives.
#[derive(Default)]
pub struct RecordingPlatformBus {
    pub events: Mutex<Vec<String>>,
}

impl RecordingPlatformBus {
    #[allow(dead_code)]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl PlatformBus for RecordingPlatformBus {
    async fn refresh_source(&self, obj_key: &str) {
        self.events
            .lock()
            .await
            .push(format!("refresh_source:{obj_key}"));
    }

    async fn refresh_requests(&self, user_id: Uuid) {
        self.events
            .lock()
            .await
            .push(format!("refresh_requests:{user_id}"));
    }

    async fn show_notification(&self, user_id: Uuid, note: &str, level: &str) {
        self.events
            .lock()
            .await
            .push(format!("notification:{user_id}:{level}:{note}"));
    }
}
