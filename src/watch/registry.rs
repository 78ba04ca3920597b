// src/watch/registry.rs

//! Pure directory → watch-process bookkeeping.
//!
//! [`WatchRegistry`] is synchronous and performs no IO; the async
//! [`Watcher`](super::Watcher) drives it and does the actual spawning and
//! signalling. Keeping the state machine here lets it be tested (and
//! property-tested) without Tokio or processes.
//!
//! Lifecycle of a directory:
//!
//! ```text
//!   (absent) --reserve--> pending --record--> {normal} --promote--> {normal, minified}
//!      ^  ^                  |                   |                        |
//!      |  +---- release -----+                   +--- detach / detach_all-+
//!      |                                                     |
//!      +------------- finish_termination ---- terminating <--+
//! ```
//!
//! A key in `entries` always carries a normal pid; no empty entries exist.
//! Each reservation carries a [`Reservation`] token, so a launch that
//! outlived a clear can neither record into nor release a newer launch's
//! reservation for the same directory.
//! A detached directory stays blocked for new launches until the watcher
//! confirms its processes are gone.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::WatchError;
use crate::types::ProcessId;

/// Processes serving one watched directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchEntry {
    /// Watcher producing expanded CSS.
    pub normal: ProcessId,
    /// Watcher producing compressed CSS, when one runs.
    pub minified: Option<ProcessId>,
}

impl WatchEntry {
    pub fn single(normal: ProcessId) -> Self {
        Self {
            normal,
            minified: None,
        }
    }

    /// Normal first, then minified.
    pub fn pids(&self) -> impl Iterator<Item = ProcessId> + '_ {
        std::iter::once(self.normal).chain(self.minified)
    }
}

impl fmt::Display for WatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.minified {
            Some(minified) => write!(f, "{}, {}", self.normal, minified),
            None => write!(f, "{}", self.normal),
        }
    }
}

/// Proof of a reservation made by [`WatchRegistry::reserve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reservation(u64);

#[derive(Debug, Default)]
pub struct WatchRegistry {
    entries: BTreeMap<PathBuf, WatchEntry>,
    /// Directories whose first process is being launched.
    pending: BTreeMap<PathBuf, Reservation>,
    next_reservation: u64,
    /// Detached entries whose processes are still being stopped.
    terminating: BTreeMap<PathBuf, WatchEntry>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `dir` for a launch.
    ///
    /// Fails if the directory is already watched, its previous processes
    /// are still being stopped, or another launch for it is in flight.
    pub fn reserve(&mut self, dir: &Path) -> Result<Reservation, WatchError> {
        if let Some(entry) = self.entries.get(dir).or_else(|| self.terminating.get(dir)) {
            return Err(WatchError::AlreadyWatched {
                directory: dir.to_path_buf(),
                entry: Some(*entry),
            });
        }
        if self.pending.contains_key(dir) {
            return Err(WatchError::AlreadyWatched {
                directory: dir.to_path_buf(),
                entry: None,
            });
        }
        let reservation = Reservation(self.next_reservation);
        self.next_reservation += 1;
        self.pending.insert(dir.to_path_buf(), reservation);
        Ok(reservation)
    }

    /// Drop `reservation` after a failed launch. Returns whether it was
    /// still held; a newer reservation for `dir` is left alone.
    pub fn release(&mut self, dir: &Path, reservation: Reservation) -> bool {
        self.take_reservation(dir, reservation)
    }

    /// Turn `reservation` into an entry holding the normal pid.
    ///
    /// Fails with `Cancelled` if the reservation was cleared in the meantime,
    /// even when `dir` has been reserved again since; the caller owns
    /// `normal` then and must terminate it.
    pub fn record(
        &mut self,
        dir: &Path,
        reservation: Reservation,
        normal: ProcessId,
    ) -> Result<(), WatchError> {
        if !self.take_reservation(dir, reservation) {
            return Err(WatchError::Cancelled {
                directory: dir.to_path_buf(),
            });
        }
        self.entries
            .insert(dir.to_path_buf(), WatchEntry::single(normal));
        Ok(())
    }

    fn take_reservation(&mut self, dir: &Path, reservation: Reservation) -> bool {
        if self.pending.get(dir) != Some(&reservation) {
            return false;
        }
        self.pending.remove(dir);
        true
    }

    /// Attach the minified pid to the entry started with `normal`.
    ///
    /// Fails with `Cancelled` if that entry is gone or was replaced.
    pub fn promote(
        &mut self,
        dir: &Path,
        normal: ProcessId,
        minified: ProcessId,
    ) -> Result<(), WatchError> {
        match self.entries.get_mut(dir) {
            Some(entry) if entry.normal == normal && entry.minified.is_none() => {
                entry.minified = Some(minified);
                Ok(())
            }
            _ => Err(WatchError::Cancelled {
                directory: dir.to_path_buf(),
            }),
        }
    }

    /// Take `dir` out of service: drop its reservation and move its entry,
    /// if any, to the terminating set. An in-flight launch for `dir` ends up
    /// `Cancelled`.
    pub fn detach(&mut self, dir: &Path) -> Option<WatchEntry> {
        self.pending.remove(dir);
        let entry = self.entries.remove(dir)?;
        self.terminating.insert(dir.to_path_buf(), entry);
        Some(entry)
    }

    /// [`detach`](Self::detach) `dir` only if it still maps to exactly
    /// `expected`.
    pub fn detach_matching(&mut self, dir: &Path, expected: &WatchEntry) -> bool {
        if self.entries.get(dir) != Some(expected) {
            return false;
        }
        self.entries.remove(dir);
        self.terminating.insert(dir.to_path_buf(), *expected);
        true
    }

    /// [`detach`](Self::detach) every directory, returning the detached
    /// entries.
    pub fn detach_all(&mut self) -> Vec<(PathBuf, WatchEntry)> {
        self.pending.clear();
        let entries = std::mem::take(&mut self.entries);
        self.terminating
            .extend(entries.iter().map(|(dir, entry)| (dir.clone(), *entry)));
        entries.into_iter().collect()
    }

    /// Forget a detached directory once its processes are gone.
    pub fn finish_termination(&mut self, dir: &Path) -> bool {
        self.terminating.remove(dir).is_some()
    }

    pub fn get(&self, dir: &Path) -> Option<&WatchEntry> {
        self.entries.get(dir)
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.entries.contains_key(dir)
    }

    pub fn is_pending(&self, dir: &Path) -> bool {
        self.pending.contains_key(dir)
    }

    pub fn is_terminating(&self, dir: &Path) -> bool {
        self.terminating.contains_key(dir)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the current mapping, without reservations or terminating
    /// entries.
    pub fn snapshot(&self) -> BTreeMap<PathBuf, WatchEntry> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(raw: u32) -> ProcessId {
        ProcessId::new(raw).unwrap()
    }

    fn dir(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn reserve_record_promote() {
        let mut reg = WatchRegistry::new();
        let d = dir("/p/src/a");

        let r = reg.reserve(&d).unwrap();
        assert!(reg.is_pending(&d));
        assert!(reg.snapshot().is_empty());

        reg.record(&d, r, pid(10)).unwrap();
        assert!(!reg.is_pending(&d));
        assert_eq!(reg.get(&d), Some(&WatchEntry::single(pid(10))));

        reg.promote(&d, pid(10), pid(11)).unwrap();
        let entry = reg.get(&d).copied().unwrap();
        assert_eq!(entry.pids().collect::<Vec<_>>(), vec![pid(10), pid(11)]);
        assert_eq!(entry.to_string(), "10, 11");
    }

    #[test]
    fn duplicate_reservations_are_rejected() {
        let mut reg = WatchRegistry::new();
        let d = dir("/p/src/a");

        let r = reg.reserve(&d).unwrap();
        assert_eq!(
            reg.reserve(&d),
            Err(WatchError::AlreadyWatched {
                directory: d.clone(),
                entry: None
            })
        );

        reg.record(&d, r, pid(10)).unwrap();
        let err = reg.reserve(&d).unwrap_err();
        assert!(err.to_string().contains("already being watched ( pid 10 )"));
    }

    #[test]
    fn record_without_reservation_is_cancelled() {
        let mut reg = WatchRegistry::new();
        let d = dir("/p/src/a");

        let r = reg.reserve(&d).unwrap();
        assert!(reg.detach_all().is_empty());
        assert!(matches!(
            reg.record(&d, r, pid(10)),
            Err(WatchError::Cancelled { .. })
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn stale_reservation_cannot_touch_a_newer_one() {
        let mut reg = WatchRegistry::new();
        let d = dir("/p/src/a");

        let stale = reg.reserve(&d).unwrap();
        assert_eq!(reg.detach(&d), None);
        let fresh = reg.reserve(&d).unwrap();
        assert_ne!(stale, fresh);

        assert!(!reg.release(&d, stale));
        assert!(reg.is_pending(&d));
        assert!(matches!(
            reg.record(&d, stale, pid(10)),
            Err(WatchError::Cancelled { .. })
        ));
        assert!(reg.is_pending(&d));

        reg.record(&d, fresh, pid(11)).unwrap();
        assert_eq!(reg.get(&d), Some(&WatchEntry::single(pid(11))));
        assert!(!reg.release(&d, fresh));
    }

    #[test]
    fn promote_requires_matching_single_entry() {
        let mut reg = WatchRegistry::new();
        let d = dir("/p/src/a");

        assert!(reg.promote(&d, pid(1), pid(2)).is_err());

        let r = reg.reserve(&d).unwrap();
        reg.record(&d, r, pid(1)).unwrap();
        assert!(reg.promote(&d, pid(99), pid(2)).is_err());
        reg.promote(&d, pid(1), pid(2)).unwrap();
        assert!(reg.promote(&d, pid(1), pid(3)).is_err());
    }

    #[test]
    fn detach_matching_leaves_replaced_entries() {
        let mut reg = WatchRegistry::new();
        let d = dir("/p/src/a");
        let r = reg.reserve(&d).unwrap();
        reg.record(&d, r, pid(1)).unwrap();

        assert!(!reg.detach_matching(&d, &WatchEntry::single(pid(2))));
        assert!(reg.contains(&d));
        assert!(reg.detach_matching(&d, &WatchEntry::single(pid(1))));
        assert!(!reg.contains(&d));
        assert!(reg.is_terminating(&d));
    }

    #[test]
    fn detach_unknown_directory_is_noop() {
        let mut reg = WatchRegistry::new();
        assert_eq!(reg.detach(&dir("/nowhere")), None);
        assert!(reg.is_empty());
        assert!(!reg.is_terminating(&dir("/nowhere")));
    }

    #[test]
    fn detached_directory_is_blocked_until_terminated() {
        let mut reg = WatchRegistry::new();
        let d = dir("/p/src/a");
        let r = reg.reserve(&d).unwrap();
        reg.record(&d, r, pid(7)).unwrap();

        assert_eq!(reg.detach(&d), Some(WatchEntry::single(pid(7))));
        assert!(reg.snapshot().is_empty());
        assert!(reg.is_terminating(&d));
        assert_eq!(
            reg.reserve(&d),
            Err(WatchError::AlreadyWatched {
                directory: d.clone(),
                entry: Some(WatchEntry::single(pid(7))),
            })
        );

        assert!(reg.finish_termination(&d));
        assert!(!reg.finish_termination(&d));
        reg.reserve(&d).unwrap();
    }

    #[test]
    fn detach_all_empties_everything() {
        let mut reg = WatchRegistry::new();
        for (i, d) in ["/a", "/b"].iter().enumerate() {
            let r = reg.reserve(Path::new(d)).unwrap();
            reg.record(Path::new(d), r, pid(i as u32 + 1)).unwrap();
        }
        reg.reserve(Path::new("/c")).unwrap();

        let taken = reg.detach_all();
        assert_eq!(taken.len(), 2);
        assert!(reg.is_empty());
        assert!(!reg.is_pending(Path::new("/c")));
        assert!(reg.is_terminating(Path::new("/a")));
        assert!(reg.is_terminating(Path::new("/b")));
    }
}
