//! Domain models for the Swift facility adapter.

pub mod allocation;
pub mod comment;
pub mod config;
pub mod observation;
pub mod request;
pub mod transaction;

pub use allocation::{Allocation, AllocationCredentials, NotificationConfig};
pub use comment::Comment;
pub use config::{Config, DatabaseConfig, LoggingConfig, TooEndpointConfig};
pub use observation::Observation;
pub use request::{
    parse_ut_timestamp, DataQueryForm, FollowupRequest, RequestPayload, Target, TooForm,
    XrtJobForm,
};
pub use transaction::{FacilityTransaction, HttpRequestRecord, HttpResponseRecord};
