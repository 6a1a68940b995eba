pub mod backfill;
pub mod notifications;
pub mod request_builder;
pub mod result_fetcher;
pub mod submitter;
pub mod worker_pool;

pub use backfill::ObservationBackfill;
pub use notifications::NotificationDispatcher;
pub use request_builder::FacilityPayload;
pub use result_fetcher::ResultFetcher;
pub use submitter::{SubmitOptions, Submitter};
pub use worker_pool::WorkerPool;
