// src/watch/watcher.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::compiler::{BackendSelector, Compiler, CompilerSelector};
use crate::config::CompilerConfig;
use crate::errors::WatchError;
use crate::exec::{ProcessControl, SignalProcessControl};
use crate::target::{watch_minified_target_directory, watch_target_directory, xform_path};
use crate::types::{LaunchStatus, ProcessId};
use crate::watch::registry::{WatchEntry, WatchRegistry};

/// Per-directory launch handle returned by [`Watcher::relaunch`].
pub type LaunchHandle = JoinHandle<Result<LaunchStatus, WatchError>>;

/// Starts, stops and relaunches watch processes per source directory.
///
/// This is the async shell around [`WatchRegistry`]: it asks the selected
/// compiler for processes, records their ids, and terminates them through
/// [`ProcessControl`]. Cloning is cheap and every clone shares the same
/// registry; the registry lock is never held across an `.await`.
#[derive(Clone)]
pub struct Watcher {
    registry: Arc<Mutex<WatchRegistry>>,
    selector: Arc<dyn CompilerSelector>,
    control: Arc<dyn ProcessControl>,
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("registry", &*self.registry())
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

impl Watcher {
    pub fn new(selector: Arc<dyn CompilerSelector>, control: Arc<dyn ProcessControl>) -> Self {
        Self {
            registry: Arc::new(Mutex::new(WatchRegistry::new())),
            selector,
            control,
        }
    }

    /// Production wiring: backend from the config, signal-based control with
    /// the configured grace period.
    pub fn from_config(config: &CompilerConfig) -> Self {
        let grace = Duration::from_millis(config.watch.terminate_timeout_ms);
        Self::new(
            Arc::new(BackendSelector),
            Arc::new(SignalProcessControl::new(grace)),
        )
    }

    fn registry(&self) -> MutexGuard<'_, WatchRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start watching `directory` (relative to `project_root`).
    ///
    /// Launches the normal-output watcher and, when minified output is
    /// enabled and goes to a different directory, a second minified-output
    /// watcher. Either both end up registered or neither keeps running.
    pub async fn launch(
        &self,
        directory: &str,
        project_root: &Path,
        config: &CompilerConfig,
    ) -> Result<LaunchStatus, WatchError> {
        let source_dir = xform_path(project_root, directory);
        let reservation = self.registry().reserve(&source_dir)?;

        let compiler = self.selector.select(config);
        debug!(
            directory = %source_dir.display(),
            backend = compiler.name(),
            "launching watch"
        );

        let normal = match start_process(&*compiler, &source_dir, project_root, config, false).await
        {
            Ok(pid) => pid,
            Err(reason) => {
                self.registry().release(&source_dir, reservation);
                return Err(WatchError::LaunchFailed {
                    directory: source_dir,
                    setting: compiler.executable_setting(),
                    reason,
                });
            }
        };

        let recorded = self.registry().record(&source_dir, reservation, normal);
        if let Err(err) = recorded {
            warn!(
                directory = %source_dir.display(),
                pid = %normal,
                "directory cleared while launching; stopping new watch process"
            );
            self.terminate(&source_dir, normal).await;
            return Err(err);
        }
        info!(directory = %source_dir.display(), pid = %normal, "watch process started");

        if config.output.disable_minified_file_generation {
            return Ok(LaunchStatus::Single);
        }

        let target = watch_target_directory(&source_dir, project_root, config);
        let minified_target = watch_minified_target_directory(&source_dir, project_root, config);
        if target == minified_target {
            warn!(
                directory = %source_dir.display(),
                target = %target.display(),
                "target and minified target are the same; not starting a minified watch \
                 (check [output].target_minified_directory)"
            );
            return Ok(LaunchStatus::TargetCollision);
        }

        match start_process(&*compiler, &source_dir, project_root, config, true).await {
            Ok(minified) => {
                let promoted = self.registry().promote(&source_dir, normal, minified);
                match promoted {
                    Ok(()) => {
                        info!(
                            directory = %source_dir.display(),
                            pid = %minified,
                            "minified watch process started"
                        );
                        Ok(LaunchStatus::WithMinified)
                    }
                    Err(err) => {
                        self.terminate(&source_dir, minified).await;
                        Err(err)
                    }
                }
            }
            Err(reason) => {
                warn!(
                    directory = %source_dir.display(),
                    error = %reason,
                    "minified watch failed; rolling back normal watch"
                );
                let detached = self
                    .registry()
                    .detach_matching(&source_dir, &WatchEntry::single(normal));
                if detached {
                    self.terminate(&source_dir, normal).await;
                    self.registry().finish_termination(&source_dir);
                }
                Err(WatchError::PartialLaunch {
                    directory: source_dir,
                    reason,
                })
            }
        }
    }

    /// Stop watching `directory` (relative to `project_root`).
    pub async fn clear_watch(&self, directory: &str, project_root: &Path) -> bool {
        let source_dir = xform_path(project_root, directory);
        self.clear_watch_directory(&source_dir).await
    }

    /// Stop watching an already resolved directory.
    ///
    /// Always `true`: an unknown directory is a no-op. The entry is detached
    /// first, so a launch still in flight for it sees the clear; the
    /// directory is only released for new launches once every process is
    /// gone.
    pub async fn clear_watch_directory(&self, source_dir: &Path) -> bool {
        let entry = self.registry().detach(source_dir);
        match entry {
            Some(entry) => {
                for pid in entry.pids() {
                    self.terminate(source_dir, pid).await;
                }
                self.registry().finish_termination(source_dir);
            }
            None => info!(
                directory = %source_dir.display(),
                "no watch process recorded; nothing to clear"
            ),
        }
        true
    }

    /// Terminate every watch process and empty the registry.
    pub async fn clear_all(&self) {
        let entries = self.registry().detach_all();
        if entries.is_empty() {
            debug!("no watches to clear");
            return;
        }

        let mut terminations = JoinSet::new();
        for (dir, entry) in entries {
            let watcher = self.clone();
            terminations.spawn(async move {
                for pid in entry.pids() {
                    watcher.terminate(&dir, pid).await;
                }
                watcher.registry().finish_termination(&dir);
            });
        }

        while let Some(res) = terminations.join_next().await {
            if let Err(e) = res {
                warn!(error = %e, "termination task failed");
            }
        }
    }

    /// Clear everything, then launch every directory listed in the config.
    ///
    /// Launches run concurrently and independently; the returned handles
    /// let the caller observe (or ignore) each outcome.
    pub async fn relaunch(
        &self,
        project_root: &Path,
        config: Arc<CompilerConfig>,
    ) -> Vec<(String, LaunchHandle)> {
        self.clear_all().await;

        info!(
            directories = config.watch.directories.len(),
            "relaunching watches"
        );

        config
            .watch
            .directories
            .iter()
            .map(|directory| {
                let watcher = self.clone();
                let root = project_root.to_path_buf();
                let config = Arc::clone(&config);
                let dir = directory.clone();
                let handle =
                    tokio::spawn(async move { watcher.launch(&dir, &root, &config).await });
                (directory.clone(), handle)
            })
            .collect()
    }

    /// Drop entries whose processes have died. Returns how many were dropped.
    ///
    /// A surviving partner process (normal or minified) of a dead one is
    /// terminated so the directory can be relaunched cleanly.
    pub async fn verify(&self) -> usize {
        let mut dropped = 0;

        for (dir, entry) in self.watch_list() {
            let dead: Vec<ProcessId> = entry
                .pids()
                .filter(|pid| !self.control.is_alive(*pid))
                .collect();
            if dead.is_empty() {
                continue;
            }

            let detached = self.registry().detach_matching(&dir, &entry);
            if !detached {
                continue;
            }
            warn!(
                directory = %dir.display(),
                ?dead,
                "watch process no longer running; dropping entry"
            );
            for pid in entry.pids().filter(|pid| !dead.contains(pid)) {
                self.terminate(&dir, pid).await;
            }
            self.registry().finish_termination(&dir);
            dropped += 1;
        }

        dropped
    }

    /// Snapshot of directory → processes.
    pub fn watch_list(&self) -> BTreeMap<PathBuf, WatchEntry> {
        self.registry().snapshot()
    }

    /// End of life: terminate every watch process.
    pub async fn shutdown(self) {
        info!("shutting down watcher");
        self.clear_all().await;
    }

    async fn terminate(&self, dir: &Path, pid: ProcessId) {
        self.control.terminate(pid).await;
        info!(directory = %dir.display(), %pid, "terminated watch process");
    }
}

/// Ask `compiler` for a watch process and validate the outcome.
async fn start_process(
    compiler: &dyn Compiler,
    source_dir: &Path,
    project_root: &Path,
    config: &CompilerConfig,
    minified: bool,
) -> Result<ProcessId, String> {
    let kind = if minified { "minified" } else { "normal" };
    match compiler.watch(source_dir, project_root, config, minified).await {
        Ok(outcome) if outcome.killed => Err(format!("{kind} watch process was killed")),
        Ok(outcome) => outcome
            .usable_pid()
            .ok_or_else(|| format!("{kind} watch process reported no usable pid")),
        Err(err) => Err(err.to_string()),
    }
}
