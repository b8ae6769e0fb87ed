//! MergeService: orchestrates sources, applies merge policy, deserializes to TreeliftConfig.

use crate::config::sources::{environment, file};
use crate::config::TreeliftConfig;
use config::ConfigError;
use std::path::Path;

use super::builder_with_defaults;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> global file -> explicit file -> environment (highest).
    pub fn load(explicit: Option<&Path>) -> Result<TreeliftConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = file::add_global_to_builder(builder)?;
        let builder = match explicit {
            Some(path) => file::add_explicit_to_builder(builder, path)?,
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
