use std::ffi::OsString;
use std::path::Path;

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::info;

use crate::engine::SupervisorEvent;

/// Handle for the config-file watcher.
///
/// Dropping this handle stops watching.
pub struct ConfigWatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for ConfigWatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigWatcherHandle").finish()
    }
}

/// Send `SupervisorEvent::ConfigChanged` whenever `config_path` is written,
/// created or replaced.
///
/// The parent directory is watched rather than the file itself: editors
/// often save by renaming a temp file over the existing one, which would orphan
/// a watch on the file's inode.
pub fn spawn_config_watcher(
    config_path: &Path,
    runtime_tx: mpsc::Sender<SupervisorEvent>,
) -> Result<ConfigWatcherHandle> {
    let file_name: OsString = config_path
        .file_name()
        .context("config path has no file name")?
        .to_os_string();
    let dir = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().context("resolving current directory")?,
    };
    let watched = dir.join(&file_name);

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !is_config_event(&event, &file_name) {
                    return;
                }
                // A full channel already holds a pending reload.
                let _ = runtime_tx.try_send(SupervisorEvent::ConfigChanged);
            }
            Err(err) => {
                // We can't log via tracing from the notify thread reliably;
                // fall back to stderr.
                eprintln!("sasswatch: config watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&dir, RecursiveMode::NonRecursive)?;

    info!("watching config file {:?}", watched);

    Ok(ConfigWatcherHandle { _inner: watcher })
}

fn is_config_event(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};
    use std::path::PathBuf;

    #[test]
    fn only_writes_to_the_config_file_count() {
        let name = OsString::from("Sasswatch.toml");

        let write = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/p/Sasswatch.toml"));
        assert!(is_config_event(&write, &name));

        let create = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/p/Sasswatch.toml"));
        assert!(is_config_event(&create, &name));

        let other = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/p/styles.scss"));
        assert!(!is_config_event(&other, &name));

        let access = Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(PathBuf::from("/p/Sasswatch.toml"));
        assert!(!is_config_event(&access, &name));
    }
}
