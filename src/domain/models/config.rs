//! Adapter configuration model.
//!
//! One struct constructed at process start and passed by reference into
//! each component; nothing reads endpoint configuration at import time.

use serde::{Deserialize, Serialize};

/// ToO submission endpoint location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TooEndpointConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
}

impl Default for TooEndpointConfig {
    fn default() -> Self {
        Self {
            protocol: "https".to_string(),
            host: "www.swift.psu.edu".to_string(),
            port: 443,
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: ".swiftlink/swiftlink.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of: trace, debug, info, warn, error.
    pub level: String,
    /// One of: json, pretty.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Top-level adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// ToO submission endpoint.
    pub too: TooEndpointConfig,
    /// Base URL of the XRT product-build service.
    pub xrt_endpoint: String,
    /// Base URL of the observation archive / data services.
    pub archive_endpoint: String,
    /// Optional relay URL used for email notifications.
    pub email_endpoint: Option<String>,
    /// Background worker pool size for data downloads and backfills.
    pub worker_pool_size: usize,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            too: TooEndpointConfig::default(),
            xrt_endpoint: "https://www.swift.ac.uk/user_objects".to_string(),
            archive_endpoint: "https://www.swift.ac.uk/archive".to_string(),
            email_endpoint: None,
            worker_pool_size: 4,
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Full ToO submission URL.
    pub fn too_submit_url(&self) -> String {
        format!(
            "{}://{}:{}/toop/submit_api.php",
            self.too.protocol, self.too.host, self.too.port
        )
    }

    /// Full XRT product-build job URL.
    pub fn xrt_submit_url(&self) -> String {
        format!("{}/run_userobject.php", self.xrt_endpoint)
    }
}
