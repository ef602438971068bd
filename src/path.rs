//! Canonical path value type.
//!
//! A `CanonPath` is a normalized absolute path computed once and reused both
//! as the filesystem target and as the lock-registry key, so the two can
//! never silently diverge. Normalization is lexical (`.` and `..` segments
//! resolved, no trailing separator except at the root) and does not require
//! the path to exist, since lock keys are taken for creation targets too.

use std::fmt;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonPath(PathBuf);

impl CanonPath {
    /// Normalize an absolute path. Relative inputs are resolved against the
    /// current working directory first.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("/"))
                .join(path)
        };
        CanonPath(normalize(&absolute))
    }

    /// Normalize an existing path through the OS resolver when possible
    /// (resolves symlinks; `dunce` keeps Windows paths free of `\\?\`).
    /// Falls back to lexical normalization for paths that do not exist yet.
    pub fn resolve(path: impl AsRef<Path>) -> Self {
        match dunce::canonicalize(path.as_ref()) {
            Ok(real) => CanonPath(real),
            Err(_) => Self::new(path),
        }
    }

    /// Child path: `name` must be a bare segment (validated by callers).
    pub fn join(&self, name: &str) -> Self {
        CanonPath(normalize(&self.0.join(name)))
    }

    pub fn parent(&self) -> Option<Self> {
        self.0.parent().map(|p| CanonPath(p.to_path_buf()))
    }

    /// True when `self` is `other` or one of its ancestors. Used by the
    /// delete guard against removing a directory through itself.
    pub fn is_ancestor_of(&self, other: &CanonPath) -> bool {
        other.0.starts_with(&self.0)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Registry key. One string per canonical location.
    pub fn key(&self) -> String {
        self.0.to_string_lossy().into_owned()
    }

    pub fn exists(&self) -> bool {
        self.0.exists()
    }

    pub fn is_dir(&self) -> bool {
        self.0.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.0.is_file()
    }
}

impl fmt::Display for CanonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for CanonPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Lexical normalization: resolve `.` and `..`, collapse separators.
/// `..` at the root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root / prefix.
                if out.parent().is_some() {
                    out.pop();
                }
            }
            Component::Normal(seg) => out.push(seg),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(Component::RootDir.as_os_str());
    }
    out
}
