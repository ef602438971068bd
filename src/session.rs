//! Session: the public API surface of the core.
//!
//! A session binds a cursor, a lock registry and a worker pool, and is
//! passed by reference to every operation: there is no process-wide
//! state. The registry may be shared between sessions (it is the unit of
//! cross-session serialization); cursor and pool are per-session.

use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use crate::cursor::Cursor;
use crate::desktop;
use crate::errors::{OpError, OpResult};
use crate::listing::{self, ListOptions};
use crate::lock::LockRegistry;
use crate::ops::{self, CreateKind};
use crate::path::CanonPath;
use crate::pool::{Deferred, Job, WorkerPool};

/// Metadata snapshot returned by [`Session::properties`]; the REPL renders
/// it for humans.
#[derive(Debug, Clone)]
pub struct EntityProps {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub created: Option<SystemTime>,
    pub accessed: Option<SystemTime>,
    pub modified: Option<SystemTime>,
    pub readonly: bool,
}

pub struct Session {
    cursor: Cursor,
    registry: Arc<LockRegistry>,
    pool: WorkerPool,
}

impl Session {
    /// Open a session rooted at `start_dir` (created on first reference)
    /// with a fresh registry and a pool sized to available parallelism.
    pub fn new(start_dir: &Path) -> Result<Self, OpError> {
        Self::with_registry(start_dir, Arc::new(LockRegistry::new()), None)
    }

    /// Open a session over a shared registry, optionally overriding the
    /// worker-thread count.
    pub fn with_registry(
        start_dir: &Path,
        registry: Arc<LockRegistry>,
        threads: Option<usize>,
    ) -> Result<Self, OpError> {
        Ok(Self {
            cursor: Cursor::new(start_dir)?,
            registry,
            pool: WorkerPool::new(threads)?,
        })
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn registry(&self) -> &Arc<LockRegistry> {
        &self.registry
    }

    /// The current working directory as a display string.
    pub fn pwd(&self) -> String {
        self.cursor.display()
    }

    // --- navigation ---

    pub fn cd(&mut self, destination: &str) -> OpResult {
        self.cursor.cd(destination)
    }

    pub fn step_in(&mut self, target: &str) -> OpResult {
        self.cursor.step_in(target)
    }

    pub fn step_out(&mut self) -> OpResult {
        self.cursor.step_out()
    }

    // --- search ---

    pub fn list_files(&self, opts: ListOptions) -> Result<Vec<String>, OpError> {
        listing::list_files(&self.cursor.location(), opts)
    }

    pub fn list_dirs(&self, opts: ListOptions) -> Result<Vec<String>, OpError> {
        listing::list_dirs(&self.cursor.location(), opts)
    }

    pub fn find(&self, pattern: &str, opts: ListOptions) -> Result<Vec<String>, OpError> {
        listing::regex_filter(&self.cursor.location(), pattern, opts)
    }

    // --- mutation ---

    pub fn create_files(&self, destination: &str, names: &[String]) -> OpResult {
        let dest = self.resolve_dest(destination)?;
        ops::create(&self.registry, &dest, names, CreateKind::File)
    }

    pub fn create_dirs(&self, destination: &str, names: &[String]) -> OpResult {
        let dest = self.resolve_dest(destination)?;
        ops::create(&self.registry, &dest, names, CreateKind::Dir)
    }

    pub fn delete(&self, names: &[String]) -> OpResult {
        ops::delete(&self.registry, &self.cursor.canon(), names)
    }

    /// Batch copy on the worker pool; blocks for the whole batch and
    /// reports the first non-success in submission order.
    pub fn copy(&self, names: &[String], destination: &str) -> OpResult {
        self.copy_async(names, destination)?.wait()
    }

    /// Batch copy on the worker pool, returning the deferred handle.
    pub fn copy_async(&self, names: &[String], destination: &str) -> Result<Deferred, OpError> {
        let dest = self.resolve_dest(destination)?;
        let src = self.cursor.canon();
        let jobs: Vec<Job> = names
            .iter()
            .map(|name| {
                let registry = Arc::clone(&self.registry);
                let src = src.clone();
                let dest = dest.clone();
                let name = name.clone();
                Box::new(move || ops::copy_entry(&registry, &src, &name, &dest, &name)) as Job
            })
            .collect();
        self.pool.submit_batch(jobs)
    }

    /// Synchronous batch copy on the calling thread (the `slowcp` variant):
    /// one pair at a time, fail-fast.
    pub fn copy_sync(&self, names: &[String], destination: &str) -> OpResult {
        let dest = self.resolve_dest(destination)?;
        let src = self.cursor.canon();
        for name in names {
            ops::copy_entry(&self.registry, &src, name, &dest, name)?;
        }
        Ok(())
    }

    /// Batch move on the worker pool. After the batch settles, any
    /// in-memory cursor state referencing a moved path's old location is
    /// rewritten to the new one.
    pub fn move_entries(&mut self, names: &[String], destination: &str) -> OpResult {
        let dest = self.resolve_dest(destination)?;
        let src = self.cursor.canon();
        let jobs: Vec<Job> = names
            .iter()
            .map(|name| {
                let registry = Arc::clone(&self.registry);
                let src = src.clone();
                let dest = dest.clone();
                let name = name.clone();
                Box::new(move || ops::move_entry(&registry, &src, &name, &dest, &name)) as Job
            })
            .collect();
        let outcome = self.pool.submit_batch(jobs)?.wait();

        for name in names {
            let old = src.join(name);
            let new = dest.join(name);
            if !old.exists() && new.exists() {
                self.cursor.relocate(&old, &new);
            }
        }
        outcome
    }

    /// `rename(old, new)` is `move(".", old, ".", new)`.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> OpResult {
        let here = self.cursor.canon();
        let outcome = ops::move_entry(&self.registry, &here, old_name, &here, new_name);
        if outcome.is_ok() {
            self.cursor.relocate(&here.join(old_name), &here.join(new_name));
        }
        outcome
    }

    // --- collaborators ---

    /// Metadata snapshot of a child of the current directory.
    pub fn properties(&self, name: &str) -> Result<EntityProps, OpError> {
        let target = self.cursor.canon().join(name);
        if !target.exists() {
            return Err(OpError::EntityNotFound);
        }
        if self.registry.locked_elsewhere(std::slice::from_ref(&target)) {
            return Err(OpError::EntityIsLocked);
        }

        let _guard = self.registry.guard(vec![target.clone()]);
        let meta = std::fs::metadata(target.as_path()).map_err(|e| {
            debug!(path = %target, error = %e, "metadata read failed");
            OpError::from_io(&e)
        })?;
        Ok(EntityProps {
            name: name.to_string(),
            is_dir: meta.is_dir(),
            size: meta.len(),
            created: meta.created().ok(),
            accessed: meta.accessed().ok(),
            modified: meta.modified().ok(),
            readonly: meta.permissions().readonly(),
        })
    }

    /// Open a child of the current directory with the OS default app.
    pub fn open_external(&self, name: &str) -> OpResult {
        desktop::open_external(&self.registry, &self.cursor.canon(), name)
    }

    /// Stop accepting async work and wait for in-flight units.
    pub fn drain(&self) {
        self.pool.drain();
    }

    /// Resolve a destination argument: `.` is the cursor's directory, `~`
    /// the home directory, absolute paths stand alone and anything else is
    /// relative to the cursor.
    fn resolve_dest(&self, destination: &str) -> Result<CanonPath, OpError> {
        if destination.is_empty() || destination == "." {
            return Ok(self.cursor.canon());
        }
        if let Some(rest) = destination.strip_prefix('~') {
            let home = dirs::home_dir().ok_or(OpError::DirNotFound)?;
            return Ok(CanonPath::new(home.join(rest.trim_start_matches('/'))));
        }
        if Path::new(destination).is_absolute() {
            return Ok(CanonPath::new(destination));
        }
        Ok(CanonPath::new(self.cursor.location().join(destination)))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // The pool must be drained before the session is discarded so no
        // background mutation outlives its owner.
        self.pool.drain();
    }
}

/// Scratch-session constructor for downstream test suites.
#[cfg(any(test, feature = "test-helpers"))]
pub fn scratch_session() -> (tempfile::TempDir, Session) {
    let td = tempfile::tempdir().expect("scratch dir");
    let session = Session::new(td.path()).expect("scratch session");
    (td, session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pwd_matches_start_dir() {
        let (td, session) = scratch_session();
        let canonical = dunce::canonicalize(td.path()).unwrap();
        assert_eq!(session.pwd(), canonical.to_string_lossy());
    }

    #[test]
    fn create_list_delete_round_trip() {
        let (_td, session) = scratch_session();
        session
            .create_files(".", &["b.txt".into(), "a.txt".into()])
            .unwrap();
        session.create_dirs(".", &["sub".into()]).unwrap();

        assert_eq!(
            session.list_files(ListOptions::default()).unwrap(),
            vec!["a.txt", "b.txt"]
        );
        assert_eq!(
            session.list_dirs(ListOptions::default()).unwrap(),
            vec!["sub"]
        );

        session.delete(&["a.txt".into(), "sub".into()]).unwrap();
        assert_eq!(
            session.list_files(ListOptions::default()).unwrap(),
            vec!["b.txt"]
        );
        assert!(session.list_dirs(ListOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn rename_is_move_in_place() {
        let (td, mut session) = scratch_session();
        session.create_files(".", &["old.txt".into()]).unwrap();
        session.rename("old.txt", "new.txt").unwrap();
        assert!(!td.path().join("old.txt").exists());
        assert!(td.path().join("new.txt").exists());
    }

    #[test]
    fn copy_batch_into_subdir() {
        let (td, session) = scratch_session();
        session
            .create_files(".", &["a.txt".into(), "b.txt".into()])
            .unwrap();
        session.create_dirs(".", &["out".into()]).unwrap();
        session.copy(&["a.txt".into(), "b.txt".into()], "out").unwrap();
        assert!(td.path().join("out/a.txt").exists());
        assert!(td.path().join("out/b.txt").exists());
        assert!(td.path().join("a.txt").exists());
    }

    #[test]
    fn move_batch_into_subdir() {
        let (td, mut session) = scratch_session();
        session.create_files(".", &["a.txt".into()]).unwrap();
        session.create_dirs(".", &["out".into()]).unwrap();
        session.move_entries(&["a.txt".into()], "out").unwrap();
        assert!(!td.path().join("a.txt").exists());
        assert!(td.path().join("out/a.txt").exists());
    }

    #[test]
    fn properties_of_missing_entity() {
        let (_td, session) = scratch_session();
        assert!(matches!(
            session.properties("ghost"),
            Err(OpError::EntityNotFound)
        ));
    }

    #[test]
    fn properties_reports_size() {
        let (td, session) = scratch_session();
        std::fs::write(td.path().join("f.bin"), vec![0u8; 42]).unwrap();
        let props = session.properties("f.bin").unwrap();
        assert_eq!(props.size, 42);
        assert!(!props.is_dir);
    }
}
