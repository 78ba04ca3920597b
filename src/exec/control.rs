// src/exec/control.rs

//! Terminating and probing watch processes.
//!
//! The watcher never talks to the OS directly; it goes through
//! [`ProcessControl`] so tests can record terminations instead of sending
//! signals.

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use crate::exec::BoxFuture;
use crate::types::ProcessId;

/// Termination and liveness checks for processes started by the watcher.
pub trait ProcessControl: Send + Sync + fmt::Debug {
    /// Stop the process group led by `pid` and wait (bounded) for it to go.
    ///
    /// Never fails: a process that is already gone counts as terminated.
    fn terminate(&self, pid: ProcessId) -> BoxFuture<'_, ()>;

    /// Whether `pid` still exists.
    fn is_alive(&self, pid: ProcessId) -> bool;
}

/// Signal-based control: SIGINT to the group, poll with backoff, then
/// SIGKILL once `grace` has elapsed.
#[derive(Debug, Clone)]
pub struct SignalProcessControl {
    grace: Duration,
}

impl SignalProcessControl {
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }
}

impl Default for SignalProcessControl {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

#[cfg(unix)]
impl ProcessControl for SignalProcessControl {
    fn terminate(&self, pid: ProcessId) -> BoxFuture<'_, ()> {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        Box::pin(async move {
            let group = Pid::from_raw(pid.as_raw());

            match killpg(group, Signal::SIGINT) {
                Ok(()) => debug!(%pid, "sent SIGINT to process group"),
                Err(Errno::ESRCH) => {
                    debug!(%pid, "process group already gone");
                    return;
                }
                Err(e) => {
                    warn!(%pid, error = %e, "failed to signal process group");
                    return;
                }
            }

            let start = tokio::time::Instant::now();
            let mut interval = Duration::from_millis(20);
            let max_interval = Duration::from_millis(250);

            loop {
                if !self.is_alive(pid) {
                    debug!(
                        %pid,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "process exited after SIGINT"
                    );
                    return;
                }

                if start.elapsed() >= self.grace {
                    warn!(
                        %pid,
                        grace_ms = self.grace.as_millis() as u64,
                        "process did not exit after SIGINT; sending SIGKILL"
                    );
                    match killpg(group, Signal::SIGKILL) {
                        Ok(()) | Err(Errno::ESRCH) => {}
                        Err(e) => warn!(%pid, error = %e, "failed to send SIGKILL"),
                    }
                    return;
                }

                tokio::time::sleep(interval).await;
                interval = (interval * 2).min(max_interval);
            }
        })
    }

    fn is_alive(&self, pid: ProcessId) -> bool {
        use nix::errno::Errno;
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        match kill(Pid::from_raw(pid.as_raw()), None) {
            Ok(()) => true,
            Err(Errno::ESRCH) => false,
            // EPERM: the process exists but belongs to someone else.
            Err(_) => true,
        }
    }
}

#[cfg(not(unix))]
impl ProcessControl for SignalProcessControl {
    fn terminate(&self, pid: ProcessId) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            warn!(%pid, "process group termination is only supported on unix");
        })
    }

    fn is_alive(&self, _pid: ProcessId) -> bool {
        true
    }
}
