use std::collections::HashSet;
use std::sync::Mutex;

use sasswatch::exec::{BoxFuture, ProcessControl};
use sasswatch::types::ProcessId;

/// Process control that records terminations instead of signalling.
///
/// Terminated pids count as dead; tests can also mark pids dead directly to
/// simulate a watch process crashing.
#[derive(Debug, Default)]
pub struct RecordingControl {
    terminated: Mutex<Vec<u32>>,
    dead: Mutex<HashSet<u32>>,
}

impl RecordingControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pids passed to `terminate`, in call order.
    pub fn terminated(&self) -> Vec<u32> {
        self.terminated.lock().unwrap().clone()
    }

    /// Simulate a process exiting on its own.
    pub fn mark_dead(&self, pid: u32) {
        self.dead.lock().unwrap().insert(pid);
    }
}

impl ProcessControl for RecordingControl {
    fn terminate(&self, pid: ProcessId) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.terminated.lock().unwrap().push(pid.get());
            self.dead.lock().unwrap().insert(pid.get());
        })
    }

    fn is_alive(&self, pid: ProcessId) -> bool {
        !self.dead.lock().unwrap().contains(&pid.get())
    }
}
