// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`run`] spawns compiler processes, either to completion (`run`) or as
//!   detached long-lived watchers (`run_detached`).
//! - [`control`] provides the `ProcessControl` trait used by the watcher to
//!   terminate processes and check liveness, with a signal-based implementation.

use std::future::Future;
use std::pin::Pin;

pub mod control;
pub mod run;

pub use control::{ProcessControl, SignalProcessControl};
pub use run::{Invocation, remove_line_breaks, run, run_detached};

/// Boxed `Send` future used at the trait seams (compiler, process control).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
