//! Editing the configured watch-directory list.
//!
//! The list is the seed for [`Watcher::relaunch`](crate::watch::Watcher::relaunch).
//! Entries are compared as exact strings: `src/a` and `./src/a` are
//! different entries here even though they resolve to the same directory.

use crate::config::model::CompilerConfig;
use crate::errors::{Result, SasswatchError};

/// Append `directory` unless it is already listed.
///
/// Returns whether the list changed.
pub fn watch_directory(config: &mut CompilerConfig, directory: &str) -> bool {
    let dirs = &mut config.watch.directories;
    if dirs.iter().any(|d| d == directory) {
        tracing::info!(directory, "directory already watched");
        return false;
    }
    dirs.push(directory.to_string());
    true
}

/// Remove the first entry equal to `directory`.
pub fn unwatch_directory(config: &mut CompilerConfig, directory: &str) -> Result<String> {
    let dirs = &mut config.watch.directories;
    match dirs.iter().position(|d| d == directory) {
        Some(idx) => {
            dirs.remove(idx);
            Ok(format!("{directory} unwatched"))
        }
        None => Err(SasswatchError::NotWatchedBefore(directory.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_twice_keeps_one_entry() {
        let mut cfg = CompilerConfig::default();
        assert!(watch_directory(&mut cfg, "src/a"));
        assert!(!watch_directory(&mut cfg, "src/a"));
        assert_eq!(cfg.watch.directories, vec!["src/a".to_string()]);
    }

    #[test]
    fn add_preserves_order() {
        let mut cfg = CompilerConfig::default();
        watch_directory(&mut cfg, "b");
        watch_directory(&mut cfg, "a");
        assert_eq!(cfg.watch.directories, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn unwatch_unknown_directory_fails() {
        let mut cfg = CompilerConfig::default();
        match unwatch_directory(&mut cfg, "src/x") {
            Err(SasswatchError::NotWatchedBefore(dir)) => assert_eq!(dir, "src/x"),
            other => panic!("expected NotWatchedBefore, got {other:?}"),
        }
        let err = unwatch_directory(&mut cfg, "src/x").unwrap_err();
        assert!(err.to_string().contains("not watched before"));
    }

    #[test]
    fn unwatch_removes_only_first_match() {
        let mut cfg = CompilerConfig::default();
        cfg.watch.directories = vec!["a".into(), "b".into(), "a".into()];

        let msg = unwatch_directory(&mut cfg, "a").unwrap();
        assert!(msg.contains("a"));
        assert_eq!(cfg.watch.directories, vec!["b".to_string(), "a".to_string()]);
    }
}
