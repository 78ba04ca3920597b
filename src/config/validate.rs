// src/config/validate.rs

use crate::config::model::CompilerConfig;
use crate::errors::{Result, SasswatchError};
use crate::types::CompilerBackend;

/// Check the semantic invariants serde cannot express.
pub fn validate_config(cfg: &CompilerConfig) -> Result<()> {
    validate_compiler(cfg)?;
    validate_watch_directories(cfg)?;
    validate_watch_timings(cfg)?;
    Ok(())
}

fn validate_compiler(cfg: &CompilerConfig) -> Result<()> {
    let compiler = &cfg.compiler;
    match compiler.backend {
        CompilerBackend::Native if compiler.sass_bin_path.trim().is_empty() => {
            Err(SasswatchError::ConfigError(
                "[compiler].sass_bin_path must be set for the native backend".to_string(),
            ))
        }
        CompilerBackend::DartSass if compiler.node_bin_path.trim().is_empty() => {
            Err(SasswatchError::ConfigError(
                "[compiler].node_bin_path must be set for the dartsass backend".to_string(),
            ))
        }
        CompilerBackend::DartSass if compiler.dart_sass_script.trim().is_empty() => {
            Err(SasswatchError::ConfigError(
                "[compiler].dart_sass_script must be set for the dartsass backend".to_string(),
            ))
        }
        _ => Ok(()),
    }
}

fn validate_watch_directories(cfg: &CompilerConfig) -> Result<()> {
    for (idx, dir) in cfg.watch.directories.iter().enumerate() {
        if dir.trim().is_empty() {
            return Err(SasswatchError::ConfigError(format!(
                "[watch].directories[{idx}] must not be empty"
            )));
        }
    }
    Ok(())
}

fn validate_watch_timings(cfg: &CompilerConfig) -> Result<()> {
    if cfg.watch.terminate_timeout_ms == 0 {
        return Err(SasswatchError::ConfigError(
            "[watch].terminate_timeout_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
