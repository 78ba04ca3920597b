// src/exec/run.rs

//! Spawning compiler processes.
//!
//! - [`run`] waits for the process and returns its stdout.
//! - [`run_detached`] starts a long-lived process in its own process group
//!   and returns as soon as it is running.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::errors::ProcessError;
use crate::types::ProcessOutcome;

/// How long a detached process must stay up before it counts as started.
pub const STARTUP_SETTLE: Duration = Duration::from_millis(50);

/// A fully described process launch: program, arguments, working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(s: &str) -> String {
    if s.is_empty() || s.contains(char::is_whitespace) {
        format!("\"{s}\"")
    } else {
        s.to_string()
    }
}

/// Run a process to completion.
///
/// Resolves with stdout, line breaks removed and trimmed, when the process
/// exits with code 0. Stderr lines are logged.
pub async fn run(invocation: &Invocation) -> Result<String, ProcessError> {
    debug!(cmd = %invocation, "running process");

    let mut cmd = invocation.command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: invocation.program.clone(),
        source,
    })?;

    let output = child
        .wait_with_output()
        .await
        .map_err(|source| ProcessError::Io {
            program: invocation.program.clone(),
            source,
        })?;

    for line in String::from_utf8_lossy(&output.stderr).lines() {
        debug!(program = %invocation.program, "stderr: {}", line);
    }

    if output.status.success() {
        Ok(remove_line_breaks(&String::from_utf8_lossy(&output.stdout)))
    } else {
        Err(ProcessError::Exit {
            program: invocation.program.clone(),
            code: output.status.code(),
        })
    }
}

/// Start a long-lived background process without waiting for it.
///
/// On unix the child leads a new process group so that the whole group can
/// be interrupted later (see [`ProcessControl`](super::ProcessControl)) and so
/// that a Ctrl-C in the terminal reaches only the supervisor.
///
/// Output is forwarded to the log. A process that exits within
/// [`STARTUP_SETTLE`] is reported as `killed`; otherwise a background task
/// reaps the child when it exits.
pub async fn run_detached(invocation: &Invocation) -> Result<ProcessOutcome, ProcessError> {
    let mut cmd = invocation.command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: invocation.program.clone(),
        source,
    })?;

    let pid = child.id();
    info!(cmd = %invocation, pid, "detached process launched");

    if let Some(stdout) = child.stdout.take() {
        forward_lines(stdout, pid, false);
    }
    if let Some(stderr) = child.stderr.take() {
        forward_lines(stderr, pid, true);
    }

    // A backend that cannot start (bad script path, missing module) dies
    // within milliseconds; only a process surviving the window counts.
    match tokio::time::timeout(STARTUP_SETTLE, child.wait()).await {
        Ok(Ok(status)) => {
            warn!(
                cmd = %invocation,
                pid,
                exit_code = status.code(),
                "detached process exited during startup"
            );
            return Ok(ProcessOutcome::killed(pid));
        }
        Ok(Err(source)) => {
            return Err(ProcessError::Io {
                program: invocation.program.clone(),
                source,
            });
        }
        Err(_) => {}
    }

    tokio::spawn(reap(child, invocation.program.clone(), pid));

    Ok(ProcessOutcome { pid, killed: false })
}

fn forward_lines<R>(reader: R, pid: Option<u32>, is_stderr: bool)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if is_stderr {
                warn!(pid, "Error: {}", line);
            } else {
                info!(pid, "Output: {}", line);
            }
        }
    });
}

async fn reap(mut child: Child, program: String, pid: Option<u32>) {
    match child.wait().await {
        Ok(status) => info!(
            program = %program,
            pid,
            exit_code = status.code(),
            success = status.success(),
            "detached process exited"
        ),
        Err(e) => warn!(program = %program, pid, error = %e, "waiting for detached process failed"),
    }
}

/// Strip every `\r` / `\n` and surrounding whitespace.
pub fn remove_line_breaks(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_are_removed() {
        assert_eq!(remove_line_breaks("1.77.8\n"), "1.77.8");
        assert_eq!(remove_line_breaks("a\r\nb\rc\n"), "abc");
    }

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let inv = Invocation::new("sass")
            .arg("--watch")
            .arg("my dir:out dir");
        assert_eq!(inv.to_string(), "sass --watch \"my dir:out dir\"");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_returns_trimmed_stdout() {
        let inv = Invocation::new("sh").args(["-c", "echo hello; echo world"]);
        assert_eq!(run(&inv).await.unwrap(), "helloworld");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_reports_exit_code() {
        let inv = Invocation::new("sh").args(["-c", "exit 3"]);
        match run(&inv).await {
            Err(ProcessError::Exit { code, .. }) => assert_eq!(code, Some(3)),
            other => panic!("expected Exit error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_dying_shortly_after_spawn_is_reported_killed() {
        let inv = Invocation::new("sh").args(["-c", "sleep 0.01; exit 1"]);
        let outcome = run_detached(&inv).await.unwrap();
        assert!(outcome.killed);
        assert_eq!(outcome.usable_pid(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_surviving_startup_is_reported_started() {
        let inv = Invocation::new("sleep").arg("5");
        let outcome = run_detached(&inv).await.unwrap();
        assert!(!outcome.killed);
        let pid = outcome.usable_pid().expect("sleep should be running");

        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;
        kill(Pid::from_raw(pid.as_raw()), Signal::SIGKILL).unwrap();
    }

    #[tokio::test]
    async fn spawn_failure_is_an_error() {
        let inv = Invocation::new("/definitely/not/a/sass/binary");
        assert!(matches!(run(&inv).await, Err(ProcessError::Spawn { .. })));
        assert!(matches!(
            run_detached(&inv).await,
            Err(ProcessError::Spawn { .. })
        ));
    }
}
