//! ConfigLoader facade delegating to the merge service.

use super::merge::service::MergeService;
use super::TreeliftConfig;
use crate::error::SetupError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    pub fn load() -> Result<TreeliftConfig, SetupError> {
        Ok(MergeService::load(None)?)
    }

    /// Load configuration with `path` layered over the global file.
    pub fn load_from_file(path: &Path) -> Result<TreeliftConfig, SetupError> {
        Ok(MergeService::load(Some(path))?)
    }

    /// Create default configuration.
    pub fn default() -> TreeliftConfig {
        TreeliftConfig::default()
    }
}
