//! Infrastructure layer.
//!
//! Process-level concerns that sit outside the domain and adapters:
//! configuration loading and logging initialization.

pub mod config;
pub mod logging;
