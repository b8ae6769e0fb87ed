//! Configuration
//!
//! Layered configuration: built-in defaults, the global config file, an optional
//! explicit file, then `TREELIFT_*` environment variables.

pub mod facade;
pub mod merge;
pub mod sources;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

pub use facade::ConfigLoader;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeliftConfig {
    #[serde(default)]
    pub upload: UploadOptions,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upload orchestration options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadOptions {
    /// Collection that receives every created node
    #[serde(default)]
    pub collection_id: String,

    /// Maximum concurrently outstanding remote calls; unbounded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_in_flight: Option<usize>,
}

impl UploadOptions {
    pub fn new(collection_id: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            max_in_flight: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.collection_id.trim().is_empty() {
            return Err("Collection id cannot be empty".to_string());
        }
        if self.max_in_flight == Some(0) {
            return Err("max_in_flight must be at least 1".to_string());
        }
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    300
}

/// Document store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the document store; `https://` is assumed when no scheme is given
    #[serde(default)]
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    fn endpoint_has_scheme(endpoint: &str) -> bool {
        endpoint.starts_with("http://") || endpoint.starts_with("https://")
    }

    pub fn normalized_endpoint(&self) -> String {
        let endpoint = self.endpoint.trim();
        if Self::endpoint_has_scheme(endpoint) {
            endpoint.to_string()
        } else {
            format!("https://{}", endpoint)
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("Endpoint cannot be empty".to_string());
        }
        if self.endpoint.trim().chars().any(char::is_whitespace) {
            return Err(format!("Invalid endpoint URL: {}", self.endpoint));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }
}
