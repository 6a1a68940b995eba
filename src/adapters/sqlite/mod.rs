//! SQLite persistence adapters.

pub mod connection;
pub mod followup_repository;
pub mod migrations;
pub mod observation_repository;

pub use connection::{create_pool, create_test_pool, ConnectionError};
pub use followup_repository::SqliteFollowupRepository;
pub use migrations::{all_migrations, Migrator};
pub use observation_repository::SqliteObservationRepository;
