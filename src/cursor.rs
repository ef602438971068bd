//! Directory-navigation state machine.
//!
//! The cursor is a path/name string pair: `path` holds the slash-terminated
//! ancestor prefix and `name` the current directory's own segment (empty
//! only at the filesystem root). `path + name` is always a valid, existing
//! directory once the cursor is constructed; there is no invalid or
//! transitional state observable by callers.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{OpError, OpResult};
use crate::listing::{self, ListOptions};
use crate::path::CanonPath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// Slash-terminated ancestor prefix ("/" at the root, "/home/" below it).
    path: String,
    /// Current directory's own segment; empty string only at the root.
    name: String,
}

impl Cursor {
    /// Point the cursor at `dir`, creating the directory on first reference
    /// if it does not exist yet.
    pub fn new(dir: &Path) -> Result<Self, OpError> {
        let canon = CanonPath::resolve(dir);
        if !canon.exists() {
            fs::create_dir_all(canon.as_path()).map_err(|e| {
                debug!(path = %canon, error = %e, "failed to create cursor directory");
                OpError::from_io(&e)
            })?;
        } else if !canon.is_dir() {
            return Err(OpError::DirNotFound);
        }
        Ok(Self::from_canon(&canon))
    }

    fn from_canon(canon: &CanonPath) -> Self {
        let full = canon.key().replace('\\', "/");
        match full.rfind('/') {
            Some(idx) if idx + 1 < full.len() => Cursor {
                path: full[..=idx].to_string(),
                name: full[idx + 1..].to_string(),
            },
            // "/" or a bare drive root: everything is prefix, no own segment.
            _ => Cursor { path: full, name: String::new() },
        }
    }

    /// Concatenated display string; also the cursor's identity.
    pub fn display(&self) -> String {
        format!("{}{}", self.path, self.name)
    }

    /// The cursor's directory as a filesystem path.
    pub fn location(&self) -> PathBuf {
        PathBuf::from(self.display())
    }

    /// Canonical form of the cursor's directory.
    pub fn canon(&self) -> CanonPath {
        CanonPath::new(self.location())
    }

    fn at_root(&self) -> bool {
        self.name.is_empty()
    }

    /// Enter a direct subdirectory. Fails with `DirNotFound` unless `target`
    /// appears in the current subdirectory listing.
    pub fn step_in(&mut self, target: &str) -> OpResult {
        let subdirs = listing::list_dirs(&self.location(), ListOptions { show_hidden: true })
            .map_err(|_| OpError::DirNotFound)?;
        if !subdirs.iter().any(|d| d == target) {
            return Err(OpError::DirNotFound);
        }
        if self.at_root() {
            self.name = target.to_string();
        } else {
            self.path = format!("{}{}/", self.path, self.name);
            self.name = target.to_string();
        }
        debug!(cursor = %self.display(), "step_in");
        Ok(())
    }

    /// Move to the parent directory, located via the last two separators of
    /// the concatenated string. Fails with `DirNotFound` at the root.
    pub fn step_out(&mut self) -> OpResult {
        if self.at_root() {
            return Err(OpError::DirNotFound);
        }
        // `path` is slash-terminated; the segment before its final slash is
        // the parent's own name.
        let trimmed = &self.path[..self.path.len() - 1];
        match trimmed.rfind('/') {
            Some(idx) => {
                self.name = trimmed[idx + 1..].to_string();
                self.path = trimmed[..=idx].to_string();
            }
            None => {
                // Parent is the root itself.
                self.name = String::new();
                self.path = trimmed.to_string();
                if self.path.is_empty() {
                    self.path = "/".to_string();
                }
            }
        }
        debug!(cursor = %self.display(), "step_out");
        Ok(())
    }

    /// Walk to `destination`, one segment at a time: `.` is a no-op, `..`
    /// steps out, anything else steps in. A leading `/` restarts from the
    /// filesystem root, a leading `~` from the home directory.
    ///
    /// Atomic: if any segment fails to resolve the cursor is restored to its
    /// pre-call value, so the whole `cd` either fully succeeds or has no
    /// visible effect.
    pub fn cd(&mut self, destination: &str) -> OpResult {
        let saved = self.clone();
        let result = self.cd_inner(destination);
        if result.is_err() {
            *self = saved;
        }
        result
    }

    fn cd_inner(&mut self, destination: &str) -> OpResult {
        let mut rest = destination;
        if let Some(stripped) = destination.strip_prefix('~') {
            let home = dirs::home_dir().ok_or(OpError::DirNotFound)?;
            *self = Cursor::from_canon(&CanonPath::new(&home));
            rest = stripped.trim_start_matches('/');
        } else if destination.starts_with('/') {
            *self = Cursor { path: "/".to_string(), name: String::new() };
            rest = destination.trim_start_matches('/');
        }
        for segment in rest.split('/') {
            match segment {
                "" | "." => {}
                ".." => self.step_out()?,
                name => self.step_in(name)?,
            }
        }
        Ok(())
    }

    /// Rewrite the cursor when a directory it lives in (or at) has moved.
    /// No-op when the cursor is outside `old`.
    pub(crate) fn relocate(&mut self, old: &CanonPath, new: &CanonPath) {
        let here = self.canon();
        if !old.is_ancestor_of(&here) {
            return;
        }
        let suffix = here
            .as_path()
            .strip_prefix(old.as_path())
            .map(|s| s.to_path_buf())
            .unwrap_or_default();
        let relocated = CanonPath::new(new.as_path().join(suffix));
        *self = Cursor::from_canon(&relocated);
        debug!(cursor = %self.display(), "cursor relocated after move");
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.path, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn new_creates_missing_directory() {
        let td = tempdir().unwrap();
        let target = td.path().join("fresh");
        assert!(!target.exists());
        let cur = Cursor::new(&target).unwrap();
        assert!(target.is_dir());
        assert!(cur.display().ends_with("fresh"));
    }

    #[test]
    fn display_is_path_plus_name() {
        let td = tempdir().unwrap();
        let cur = Cursor::new(td.path()).unwrap();
        let canonical = dunce::canonicalize(td.path()).unwrap();
        assert_eq!(cur.location(), canonical);
    }

    #[test]
    fn equality_is_by_concatenated_string() {
        let td = tempdir().unwrap();
        let a = Cursor::new(td.path()).unwrap();
        let b = Cursor::new(td.path()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn step_in_unknown_dir_fails() {
        let td = tempdir().unwrap();
        let mut cur = Cursor::new(td.path()).unwrap();
        let before = cur.clone();
        assert_eq!(cur.step_in("nope"), Err(OpError::DirNotFound));
        assert_eq!(cur, before);
    }

    #[test]
    fn step_in_then_out_round_trips() {
        let td = tempdir().unwrap();
        std::fs::create_dir(td.path().join("inner")).unwrap();
        let mut cur = Cursor::new(td.path()).unwrap();
        let before = cur.clone();
        cur.step_in("inner").unwrap();
        assert!(cur.display().ends_with("inner"));
        cur.step_out().unwrap();
        assert_eq!(cur, before);
    }

    #[test]
    fn step_out_at_root_fails() {
        let mut cur = Cursor { path: "/".to_string(), name: String::new() };
        assert_eq!(cur.step_out(), Err(OpError::DirNotFound));
    }

    #[test]
    fn cd_multi_segment() {
        let td = tempdir().unwrap();
        std::fs::create_dir_all(td.path().join("a/b")).unwrap();
        let mut cur = Cursor::new(td.path()).unwrap();
        cur.cd("a/b").unwrap();
        assert!(cur.display().ends_with("a/b"));
        cur.cd("../..").unwrap();
        assert_eq!(cur, Cursor::new(td.path()).unwrap());
    }

    #[test]
    fn cd_failure_restores_cursor() {
        let td = tempdir().unwrap();
        std::fs::create_dir_all(td.path().join("a/b")).unwrap();
        let mut cur = Cursor::new(td.path()).unwrap();
        let before = cur.clone();
        // "a" resolves, "missing" does not; the partial advance must roll back.
        assert_eq!(cur.cd("a/missing/b"), Err(OpError::DirNotFound));
        assert_eq!(cur, before);
    }

    #[test]
    fn cd_absolute_resets_to_root() {
        let td = tempdir().unwrap();
        let mut cur = Cursor::new(td.path()).unwrap();
        let canonical = dunce::canonicalize(td.path()).unwrap();
        let abs = canonical.to_string_lossy().into_owned();
        cur.cd(&abs).unwrap();
        assert_eq!(cur.location(), canonical);
    }

    #[test]
    fn relocate_rewrites_prefix() {
        let td = tempdir().unwrap();
        std::fs::create_dir_all(td.path().join("old/sub")).unwrap();
        let mut cur = Cursor::new(&td.path().join("old/sub")).unwrap();
        // Simulate the move before relocating.
        std::fs::rename(td.path().join("old"), td.path().join("new")).unwrap();
        cur.relocate(
            &CanonPath::resolve(td.path()).join("old"),
            &CanonPath::resolve(td.path()).join("new"),
        );
        assert!(cur.display().ends_with("new/sub"));
    }
}
