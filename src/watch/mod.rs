// src/watch/mod.rs

//! Watch-process lifecycle.
//!
//! This module is responsible for:
//! - Bookkeeping of which source directory is served by which watch
//!   processes (`registry`, pure and synchronous).
//! - Starting, stopping, verifying and relaunching those processes
//!   (`watcher`, the async shell).
//! - Noticing edits of the config file so the supervisor can relaunch
//!   (`config_watcher`, built on `notify`).
//!
//! It does **not** watch stylesheets itself; the `sass --watch` processes
//! do that.

pub mod config_watcher;
pub mod registry;
pub mod watcher;

pub use config_watcher::{ConfigWatcherHandle, spawn_config_watcher};
pub use registry::{Reservation, WatchEntry, WatchRegistry};
pub use watcher::{LaunchHandle, Watcher};
