// src/engine/mod.rs

//! Long-running `watch` mode.
//!
//! The supervisor loop in [`runtime`] reacts to:
//! - config file changes (relaunch every watch from the new config)
//! - periodic liveness checks of the watch processes
//! - shutdown signals (terminate every watch process, then exit)
//!
//! All watch-process bookkeeping lives in [`crate::watch`]; this module only
//! decides *when* to relaunch, verify or shut down.

use std::time::Duration;

/// Events flowing into the supervisor from the config watcher and Ctrl-C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorEvent {
    /// The config file was written.
    ConfigChanged,
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Quiet period after a config change before reloading, so that an editor's
/// burst of write events causes a single relaunch.
pub const CONFIG_DEBOUNCE: Duration = Duration::from_millis(200);

pub mod runtime;

pub use runtime::Supervisor;
