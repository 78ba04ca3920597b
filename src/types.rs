use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which compiler backend runs the stylesheets.
///
/// - `Native`: a `sass` executable (standalone Dart-Sass build) found at
///   `compiler.sass_bin_path`.
/// - `DartSass`: the npm `sass` package, launched through `node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerBackend {
    Native,
    DartSass,
}

impl Default for CompilerBackend {
    fn default() -> Self {
        CompilerBackend::DartSass
    }
}

impl FromStr for CompilerBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(CompilerBackend::Native),
            "dartsass" | "dart-sass" => Ok(CompilerBackend::DartSass),
            other => Err(format!(
                "invalid compiler backend: {other} (expected \"native\" or \"dartsass\")"
            )),
        }
    }
}

impl fmt::Display for CompilerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilerBackend::Native => f.write_str("native"),
            CompilerBackend::DartSass => f.write_str("dartsass"),
        }
    }
}

/// A positive OS process id, usable as a process group id for signalling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(u32);

impl ProcessId {
    /// Returns `None` for 0 and for ids that do not fit a `pid_t`.
    pub fn new(raw: u32) -> Option<Self> {
        if raw == 0 || raw > i32::MAX as u32 {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// The id as a `pid_t`; always positive.
    pub fn as_raw(self) -> i32 {
        self.0 as i32
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of trying to start a watch process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessOutcome {
    /// Raw id reported by the OS; `None` or `Some(0)` means nothing started.
    pub pid: Option<u32>,
    /// The process died before it became usable.
    pub killed: bool,
}

impl ProcessOutcome {
    pub fn started(pid: u32) -> Self {
        Self {
            pid: Some(pid),
            killed: false,
        }
    }

    pub fn killed(pid: Option<u32>) -> Self {
        Self { pid, killed: true }
    }

    /// The process id, if the outcome describes a live, usable process.
    pub fn usable_pid(&self) -> Option<ProcessId> {
        if self.killed {
            return None;
        }
        self.pid.and_then(ProcessId::new)
    }
}

/// How a successful launch ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStatus {
    /// Minified output is disabled; one process.
    Single,
    /// Normal and minified watchers are both running.
    WithMinified,
    /// Minified target equals the normal target; one process.
    TargetCollision,
}

impl fmt::Display for LaunchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchStatus::Single => f.write_str("watching"),
            LaunchStatus::WithMinified => f.write_str("watching (normal + minified)"),
            LaunchStatus::TargetCollision => {
                f.write_str("watching (minified target equals target, single process)")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_id_rejects_zero_and_overflow() {
        assert!(ProcessId::new(0).is_none());
        assert!(ProcessId::new(u32::MAX).is_none());
        assert_eq!(ProcessId::new(42).map(ProcessId::get), Some(42));
    }

    #[test]
    fn killed_outcome_has_no_usable_pid() {
        assert_eq!(ProcessOutcome::killed(Some(12)).usable_pid(), None);
        assert_eq!(ProcessOutcome::default().usable_pid(), None);
        assert_eq!(
            ProcessOutcome::started(12).usable_pid(),
            ProcessId::new(12)
        );
    }

    #[test]
    fn backend_parses_aliases() {
        assert_eq!("Native".parse::<CompilerBackend>(), Ok(CompilerBackend::Native));
        assert_eq!("dart-sass".parse::<CompilerBackend>(), Ok(CompilerBackend::DartSass));
        assert!("less".parse::<CompilerBackend>().is_err());
    }
}
