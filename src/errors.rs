// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::watch::WatchEntry;

#[derive(Error, Debug)]
pub enum SasswatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    #[error("{0} was not watched before")]
    NotWatchedBefore(String),

    #[error("Not a compilable stylesheet: {0}")]
    InvalidDocument(String),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures of the watch lifecycle.
///
/// Every variant names the resolved source directory so the CLI can print
/// it as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    #[error("{} already being watched ( pid {} )", .directory.display(), describe_entry(.entry))]
    AlreadyWatched {
        directory: PathBuf,
        /// `None` while the first launch is still in flight.
        entry: Option<WatchEntry>,
    },

    #[error(
        "failed to start watching {}: {reason}. Check `{setting}` in the config",
        .directory.display()
    )]
    LaunchFailed {
        directory: PathBuf,
        /// Config key holding the backend executable path.
        setting: &'static str,
        reason: String,
    },

    #[error(
        "watching {} for minified output failed, normal watch stopped: {reason}",
        .directory.display()
    )]
    PartialLaunch { directory: PathBuf, reason: String },

    #[error("watch on {} was cleared while it was being launched", .directory.display())]
    Cancelled { directory: PathBuf },
}

fn describe_entry(entry: &Option<WatchEntry>) -> String {
    match entry {
        Some(entry) => entry.to_string(),
        None => "pending".to_string(),
    }
}

/// Failures of the process runner.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with code {}", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    Exit { program: String, code: Option<i32> },

    #[error("waiting for `{program}` failed: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SasswatchError>;
