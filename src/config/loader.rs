// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::CompilerConfig;
use crate::config::validate::validate_config;
use crate::errors::Result;

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<CompilerConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: CompilerConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// A missing file is not an error: a project without `Sasswatch.toml` runs
/// with the defaults (and `add` creates the file).
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<CompilerConfig> {
    let path = path.as_ref();
    let config = if path.exists() {
        load_from_path(path)?
    } else {
        tracing::debug!(path = %path.display(), "config file not found; using defaults");
        CompilerConfig::default()
    };
    validate_config(&config)?;
    Ok(config)
}

/// Write the configuration back to disk (used after `add` / `remove`).
pub fn save(path: impl AsRef<Path>, config: &CompilerConfig) -> Result<()> {
    let path = path.as_ref();
    let contents = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)?;
    Ok(())
}
