//! File sources: the optional global config file and an explicit file.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};

/// Global config file location (`<config dir>/treelift/config.toml`)
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "treelift", "treelift")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the global config file when it exists.
pub fn add_global_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match global_config_path() {
        Some(path) => Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(false))),
        None => Ok(builder),
    }
}

/// Add an explicitly requested config file, which must exist.
pub fn add_explicit_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }
    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(true)))
}
