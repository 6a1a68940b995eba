//! Swiftlink - Swift satellite facility adapter
//!
//! Swiftlink connects an astronomical follow-up platform to the Neil
//! Gehrels Swift Observatory: ToO submission, XRT product-build jobs,
//! archival data retrieval and executed-observation backfill.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Follow-up request models, ports and errors
//! - **Service Layer** (`services`): Request building, submission, result
//!   retrieval, backfill and notifications
//! - **Adapter Layer** (`adapters`): Swift HTTP endpoints and SQLite persistence
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//!
//! # Example
//!
//! ```ignore
//! use swiftlink::adapters::swift::SwiftClient;
//! use swiftlink::infrastructure::config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let client = SwiftClient::new(&config);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{FacilityError, FacilityResult};
pub use domain::models::{
    Allocation, AllocationCredentials, Comment, Config, DatabaseConfig, DataQueryForm,
    FacilityTransaction, FollowupRequest, LoggingConfig, NotificationConfig, Observation,
    RequestPayload, Target, TooForm, XrtJobForm,
};
pub use domain::ports::{
    FollowupRepository, NullPlatformBus, ObservationRepository, PlatformBus,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    NotificationDispatcher, ObservationBackfill, ResultFetcher, SubmitOptions, Submitter,
    WorkerPool,
};
