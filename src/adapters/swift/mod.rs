//! Swift facility wire adapter: payload models, mode table and HTTP client.

pub mod client;
pub mod models;
pub mod uvot;

pub use client::SwiftClient;
