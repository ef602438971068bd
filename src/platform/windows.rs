//! Windows implementations of platform helpers.

use std::io;
use std::iter::once;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::process::{Command, Stdio};

use windows_sys::Win32::Storage::FileSystem::{
    GetFileAttributesW, FILE_ATTRIBUTE_HIDDEN, INVALID_FILE_ATTRIBUTES,
};

/// Windows convention: the hidden file attribute, queried via Win32.
/// Falls back to the dotfile heuristic when the attribute query fails.
pub fn is_hidden(path: &Path, name: &str) -> bool {
    let wide: Vec<u16> = path.as_os_str().encode_wide().chain(once(0)).collect();
    let attrs = unsafe { GetFileAttributesW(wide.as_ptr()) };
    if attrs == INVALID_FILE_ATTRIBUTES {
        return name.starts_with('.');
    }
    attrs & FILE_ATTRIBUTE_HIDDEN != 0
}

/// The shell opener (`cmd /C start`) ships with every supported Windows.
pub fn opener_available() -> bool {
    true
}

/// Open `path` with its associated application via the shell.
pub fn open_with_default_app(path: &Path) -> io::Result<()> {
    Command::new("cmd")
        .args(["/C", "start", ""])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}
