//! Path-scoped reentrant lock registry.
//!
//! Maps canonical path strings to held-lock entries; this is the sole shared
//! mutable state in the core. Every filesystem-touching primitive locks its
//! target path(s) here before the OS call and releases through an RAII guard
//! so the unlock runs on every exit path.
//!
//! Contract:
//! - `lock` blocks until every named path is held by the calling thread,
//!   acquiring in caller-supplied order. Re-locking a path already held by
//!   the same thread succeeds immediately and increments a hold count.
//! - `unlock` decrements and releases at zero. Unlocking a path the caller
//!   does not hold is a silent no-op, never an error.
//! - Entries are created lazily and evicted once their hold count reaches
//!   zero, so the registry only grows with live contention.
//! - No deadlock-avoidance ordering is imposed. Callers taking multiple
//!   paths must supply them in a consistent global order; the engine in this
//!   crate always locks source before destination.
//! - Locks are path-string scoped only: holding a directory does NOT cover
//!   its descendants. An operation on a file can race a concurrent delete of
//!   its parent; that is an accepted limitation of the scheme.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Condvar, Mutex};
use std::thread::{self, ThreadId};

use tracing::trace;

use crate::path::CanonPath;

struct LockEntry {
    holder: ThreadId,
    depth: u32,
}

/// In-process registry of held canonical paths.
///
/// All registry mutations run under one internal mutex (the registry is its
/// own critical section); waiters park on a single condvar and re-check
/// their entry on wakeup.
#[derive(Default)]
pub struct LockRegistry {
    entries: Mutex<HashMap<String, LockEntry>>,
    released: Condvar,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until every path in `paths` is held by the calling thread,
    /// acquiring in the order given.
    pub fn lock(&self, paths: &[CanonPath]) {
        let me = thread::current().id();
        for path in paths {
            let key = path.key();
            let mut entries = self
                .entries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            loop {
                let acquired = match entries.entry(key.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(LockEntry { holder: me, depth: 1 });
                        trace!(path = %key, "locked");
                        true
                    }
                    Entry::Occupied(mut slot) if slot.get().holder == me => {
                        slot.get_mut().depth += 1;
                        trace!(path = %key, depth = slot.get().depth, "relocked");
                        true
                    }
                    Entry::Occupied(_) => false,
                };
                if acquired {
                    break;
                }
                trace!(path = %key, "waiting for lock");
                entries = self
                    .released
                    .wait(entries)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
        }
    }

    /// Release one hold on each path. Paths not held by the caller are
    /// skipped silently.
    pub fn unlock(&self, paths: &[CanonPath]) {
        let me = thread::current().id();
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut any_released = false;
        for path in paths {
            let key = path.key();
            let fully_released = match entries.get_mut(&key) {
                Some(entry) if entry.holder == me => {
                    entry.depth -= 1;
                    entry.depth == 0
                }
                _ => {
                    trace!(path = %key, "unlock by non-holder ignored");
                    continue;
                }
            };
            if fully_released {
                entries.remove(&key);
                trace!(path = %key, "unlocked");
                any_released = true;
            }
        }
        if any_released {
            self.released.notify_all();
        }
    }

    /// True if ANY of the given paths is currently held by any thread,
    /// including the caller.
    pub fn is_locked(&self, paths: &[CanonPath]) -> bool {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        paths.iter().any(|p| entries.contains_key(&p.key()))
    }

    /// True if any of the given paths is held by a thread other than the
    /// caller. Pre-checks use this so a context's own reentrant holds do not
    /// fail its operations.
    pub fn locked_elsewhere(&self, paths: &[CanonPath]) -> bool {
        let me = thread::current().id();
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        paths
            .iter()
            .any(|p| entries.get(&p.key()).is_some_and(|e| e.holder != me))
    }

    /// Acquire `paths` and return a guard that releases them on drop, so the
    /// unlock runs on success, expected failure and panic alike.
    pub fn guard<'a>(&'a self, paths: Vec<CanonPath>) -> LockGuard<'a> {
        self.lock(&paths);
        LockGuard { registry: self, paths }
    }
}

/// RAII guard held while a set of path locks is active.
pub struct LockGuard<'a> {
    registry: &'a LockRegistry,
    paths: Vec<CanonPath>,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.registry.unlock(&self.paths);
    }
}
