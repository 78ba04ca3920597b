use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval};
use tracing::{debug, error, info, warn};

use crate::config::{CompilerConfig, load_and_validate};
use crate::errors::Result;
use crate::watch::Watcher;

use super::{CONFIG_DEBOUNCE, SupervisorEvent};

/// Keeps the configured directories under watch until shutdown.
///
/// On start and on every config change it relaunches all watches; on a
/// timer it verifies the watch processes are alive; on shutdown it clears
/// every watch before returning.
pub struct Supervisor {
    watcher: Watcher,
    config_path: PathBuf,
    project_root: PathBuf,
    config: Arc<CompilerConfig>,
    event_rx: mpsc::Receiver<SupervisorEvent>,
    /// Tasks reporting the outcome of the latest relaunch.
    reports: Vec<JoinHandle<()>>,
}

impl fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("config_path", &self.config_path)
            .field("project_root", &self.project_root)
            .finish_non_exhaustive()
    }
}

impl Supervisor {
    pub fn new(
        watcher: Watcher,
        config_path: PathBuf,
        project_root: PathBuf,
        config: CompilerConfig,
        event_rx: mpsc::Receiver<SupervisorEvent>,
    ) -> Self {
        Self {
            watcher,
            config_path,
            project_root,
            config: Arc::new(config),
            event_rx,
            reports: Vec::new(),
        }
    }

    /// Main loop. Returns after a shutdown request or when every event
    /// sender is gone; all watches are cleared either way.
    pub async fn run(mut self) -> Result<()> {
        info!("sasswatch supervisor started");

        self.relaunch().await;
        let mut verify = verify_interval(&self.config);

        loop {
            let event = tokio::select! {
                event = self.event_rx.recv() => match event {
                    Some(e) => e,
                    None => {
                        info!("supervisor event channel closed; exiting");
                        break;
                    }
                },
                _ = tick(&mut verify) => {
                    let dropped = self.watcher.verify().await;
                    if dropped > 0 {
                        warn!(dropped, "watch processes died; run with a fixed config or restart to relaunch them");
                    }
                    continue;
                }
            };

            debug!(?event, "supervisor received event");

            match event {
                SupervisorEvent::ConfigChanged => {
                    if self.settle_config_changes().await {
                        info!("shutdown requested while reloading config");
                        break;
                    }
                    if self.reload_config() {
                        verify = verify_interval(&self.config);
                        self.relaunch().await;
                    }
                }
                SupervisorEvent::ShutdownRequested => {
                    info!("shutdown requested");
                    break;
                }
            }
        }

        self.shutdown().await;
        info!("supervisor exiting");
        Ok(())
    }

    /// Wait out a burst of config events. Returns whether a shutdown request
    /// arrived in the meantime.
    async fn settle_config_changes(&mut self) -> bool {
        tokio::time::sleep(CONFIG_DEBOUNCE).await;

        let mut shutdown = false;
        while let Ok(event) = self.event_rx.try_recv() {
            if event == SupervisorEvent::ShutdownRequested {
                shutdown = true;
            }
        }
        shutdown
    }

    /// Re-read the config file. A broken config keeps the current watches.
    fn reload_config(&mut self) -> bool {
        match load_and_validate(&self.config_path) {
            Ok(config) => {
                if *self.config == config {
                    debug!("config unchanged; keeping current watches");
                    return false;
                }
                info!(path = %self.config_path.display(), "config reloaded");
                self.config = Arc::new(config);
                true
            }
            Err(e) => {
                error!(
                    path = %self.config_path.display(),
                    error = %e,
                    "config reload failed; keeping current watches"
                );
                false
            }
        }
    }

    async fn relaunch(&mut self) {
        self.reports.retain(|report| !report.is_finished());

        let launches = self
            .watcher
            .relaunch(&self.project_root, Arc::clone(&self.config))
            .await;

        for (directory, handle) in launches {
            self.reports.push(tokio::spawn(async move {
                match handle.await {
                    Ok(Ok(status)) => info!(%directory, %status, "watch launched"),
                    Ok(Err(e)) => error!(%directory, error = %e, "watch launch failed"),
                    Err(e) => error!(%directory, error = %e, "watch launch task failed"),
                }
            }));
        }
    }

    /// Clear every watch, then let in-flight launches observe the clear and
    /// stop whatever they spawned.
    async fn shutdown(&mut self) {
        self.watcher.clone().shutdown().await;
        for report in self.reports.drain(..) {
            if let Err(e) = report.await {
                warn!(error = %e, "launch report task failed");
            }
        }
    }
}

fn verify_interval(config: &CompilerConfig) -> Option<Interval> {
    match config.watch.verify_interval_secs {
        0 => None,
        secs => {
            let period = Duration::from_secs(secs);
            Some(tokio::time::interval_at(Instant::now() + period, period))
        }
    }
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
