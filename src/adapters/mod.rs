//! Adapters: external-system integrations (facility HTTP, persistence).

pub mod sqlite;
pub mod swift;
