//! Typed outcome definitions for filedeck.
//! Every core operation returns one of a fixed, closed set of outcome kinds;
//! raw system errors never cross the component boundary.

use std::io;
use thiserror::Error;

/// Closed outcome taxonomy. `Ok(())` on an [`OpResult`] is "Success";
/// everything else is one of these kinds.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OpError {
    #[error("Name contains an illegal character")]
    IllegalName,

    #[error("Entity not found")]
    EntityNotFound,

    #[error("Folder not found")]
    DirNotFound,

    #[error("File not found")]
    FileNotFound,

    #[error("File already exists")]
    FileAlreadyExists,

    #[error("Directory already exists")]
    DirAlreadyExists,

    #[error("Directory is not empty")]
    DirNotEmpty,

    #[error("Cannot work with locked entities")]
    EntityIsLocked,

    #[error("Operation not supported")]
    OperationNotSupported,

    #[error("I/O error")]
    IoError,

    #[error("Unknown error")]
    Unknown,
}

/// Result type carried by every core operation.
pub type OpResult = Result<(), OpError>;

impl OpError {
    /// Stable numeric code for scripting / structured logs.
    /// Success (the `Ok` arm of [`OpResult`]) is code 0.
    pub fn code(&self) -> u8 {
        match self {
            OpError::IllegalName => 1,
            OpError::EntityNotFound => 2,
            OpError::DirNotFound => 3,
            OpError::FileNotFound => 4,
            OpError::FileAlreadyExists => 5,
            OpError::DirAlreadyExists => 6,
            OpError::DirNotEmpty => 7,
            OpError::EntityIsLocked => 8,
            OpError::OperationNotSupported => 9,
            OpError::IoError => 10,
            OpError::Unknown => 11,
        }
    }

    /// Collapse an io error into the closed taxonomy.
    ///
    /// Callers log the underlying error (with path context) before mapping;
    /// the collapsed kind is what crosses the component boundary.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => OpError::EntityNotFound,
            io::ErrorKind::AlreadyExists => OpError::FileAlreadyExists,
            io::ErrorKind::Unsupported => OpError::OperationNotSupported,
            _ => OpError::IoError,
        }
    }
}

/// Textual message for a whole result, including the success arm.
/// The REPL prints exactly this.
pub fn status_message(result: &OpResult) -> String {
    match result {
        Ok(()) => "Success".to_string(),
        Err(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_and_distinct() {
        let all = [
            OpError::IllegalName,
            OpError::EntityNotFound,
            OpError::DirNotFound,
            OpError::FileNotFound,
            OpError::FileAlreadyExists,
            OpError::DirAlreadyExists,
            OpError::DirNotEmpty,
            OpError::EntityIsLocked,
            OpError::OperationNotSupported,
            OpError::IoError,
            OpError::Unknown,
        ];
        let mut codes: Vec<u8> = all.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
        assert!(!codes.contains(&0), "code 0 is reserved for success");
    }

    #[test]
    fn io_not_found_maps_to_entity_not_found() {
        let e = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(OpError::from_io(&e), OpError::EntityNotFound);
    }

    #[test]
    fn success_message() {
        assert_eq!(status_message(&Ok(())), "Success");
        assert_eq!(
            status_message(&Err(OpError::DirNotEmpty)),
            "Directory is not empty"
        );
    }
}
