//! Ports (trait seams) between the adapter's services and its collaborators.

pub mod errors;
pub mod followup_repository;
pub mod observation_repository;
pub mod platform_bus;

pub use errors::DatabaseError;
pub use followup_repository::FollowupRepository;
pub use observation_repository::ObservationRepository;
pub use platform_bus::{NullPlatformBus, PlatformBus};
