//! Directory listing and regex search.
//!
//! Listings return bare names (no path prefix) in lexicographic order;
//! hidden entries follow the platform convention (leading dot on Unix, the
//! hidden attribute on Windows) and are excluded unless asked for.

use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::errors::OpError;
use crate::platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// One direct child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub kind: EntryKind,
    pub hidden: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    pub show_hidden: bool,
}

/// Enumerate all direct children of `dir` as classified entries, unsorted,
/// hidden included (each entry carries its hidden flag).
pub fn entries(dir: &Path) -> Result<Vec<ListingEntry>, OpError> {
    let iter = std::fs::read_dir(dir).map_err(|e| {
        debug!(path = %dir.display(), error = %e, "read_dir failed");
        match e.kind() {
            std::io::ErrorKind::NotFound => OpError::DirNotFound,
            _ => OpError::from_io(&e),
        }
    })?;

    let mut out = Vec::new();
    for entry in iter {
        let entry = entry.map_err(|e| OpError::from_io(&e))?;
        let file_type = entry.file_type().map_err(|e| OpError::from_io(&e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let kind = if file_type.is_dir() { EntryKind::Dir } else { EntryKind::File };
        let hidden = platform::is_hidden(&entry.path(), &name);
        out.push(ListingEntry { name, kind, hidden });
    }
    Ok(out)
}

fn list_kind(dir: &Path, kind: EntryKind, opts: ListOptions) -> Result<Vec<String>, OpError> {
    let mut names: Vec<String> = entries(dir)?
        .into_iter()
        .filter(|e| e.kind == kind && (opts.show_hidden || !e.hidden))
        .map(|e| e.name)
        .collect();
    names.sort();
    Ok(names)
}

/// Bare file names under `dir`, lexicographic.
pub fn list_files(dir: &Path, opts: ListOptions) -> Result<Vec<String>, OpError> {
    list_kind(dir, EntryKind::File, opts)
}

/// Bare subdirectory names under `dir`, lexicographic.
pub fn list_dirs(dir: &Path, opts: ListOptions) -> Result<Vec<String>, OpError> {
    list_kind(dir, EntryKind::Dir, opts)
}

/// Filter the union of files and folders by `pattern`, requiring a full
/// match (not substring search) against each bare name. Results keep the
/// files-then-folders enumeration order.
///
/// The pattern is compiled once, before any listing I/O; an invalid pattern
/// is an input-validation failure.
pub fn regex_filter(dir: &Path, pattern: &str, opts: ListOptions) -> Result<Vec<String>, OpError> {
    let anchored = format!("^(?:{pattern})$");
    let re = Regex::new(&anchored).map_err(|e| {
        debug!(%pattern, error = %e, "rejecting malformed search pattern");
        OpError::IllegalName
    })?;

    let mut matches = list_files(dir, opts)?;
    matches.extend(list_dirs(dir, opts)?);
    matches.retain(|name| re.is_match(name));
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn scratch() -> tempfile::TempDir {
        let td = tempdir().unwrap();
        fs::write(td.path().join("b.txt"), b"").unwrap();
        fs::write(td.path().join("a.txt"), b"").unwrap();
        fs::create_dir(td.path().join("zdir")).unwrap();
        fs::create_dir(td.path().join("adir")).unwrap();
        td
    }

    #[test]
    fn files_sorted() {
        let td = scratch();
        let files = list_files(td.path(), ListOptions::default()).unwrap();
        assert_eq!(files, vec!["a.txt", "b.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn dotfiles_hidden_unless_requested() {
        let td = scratch();
        fs::write(td.path().join(".hidden"), b"").unwrap();
        let files = list_files(td.path(), ListOptions::default()).unwrap();
        assert_eq!(files, vec!["a.txt", "b.txt"]);
        let files = list_files(td.path(), ListOptions { show_hidden: true }).unwrap();
        assert_eq!(files, vec![".hidden", "a.txt", "b.txt"]);
    }

    #[test]
    fn dirs_sorted() {
        let td = scratch();
        let dirs = list_dirs(td.path(), ListOptions::default()).unwrap();
        assert_eq!(dirs, vec!["adir", "zdir"]);
    }

    #[test]
    fn missing_dir_reports_dir_not_found() {
        let td = tempdir().unwrap();
        let gone = td.path().join("gone");
        assert_eq!(
            list_files(&gone, ListOptions::default()),
            Err(OpError::DirNotFound)
        );
    }

    #[test]
    fn filter_requires_full_match() {
        let td = tempdir().unwrap();
        fs::write(td.path().join("foo"), b"").unwrap();
        fs::write(td.path().join("foobar"), b"").unwrap();

        let exact = regex_filter(td.path(), "foo", ListOptions::default()).unwrap();
        assert_eq!(exact, vec!["foo"]);

        let wild = regex_filter(td.path(), "foo.*", ListOptions::default()).unwrap();
        assert_eq!(wild, vec!["foo", "foobar"]);
    }

    #[test]
    fn filter_orders_files_before_dirs() {
        let td = scratch();
        let all = regex_filter(td.path(), ".*", ListOptions::default()).unwrap();
        assert_eq!(all, vec!["a.txt", "b.txt", "adir", "zdir"]);
    }

    #[test]
    fn malformed_pattern_is_illegal_name() {
        let td = scratch();
        assert_eq!(
            regex_filter(td.path(), "(unclosed", ListOptions::default()),
            Err(OpError::IllegalName)
        );
    }
}
