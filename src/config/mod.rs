// src/config/mod.rs

//! Configuration loading and validation for sasswatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load / save a config file (`loader.rs`).
//! - Validate invariants serde cannot express (`validate.rs`).
//! - Edit the watch-directory list (`directories.rs`).

pub mod directories;
pub mod loader;
pub mod model;
pub mod validate;

pub use directories::{unwatch_directory, watch_directory};
pub use loader::{load_and_validate, load_from_path, save};
pub use model::{CompilerConfig, CompilerSection, OutputSection, WatchSection};
pub use validate::validate_config;
