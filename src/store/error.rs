//! Store error types
//!
//! Errors raised while reading source files or the persisted merged list.

use crate::merge::DataIntegrityError;
use crate::records::RecordError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or persisting datasets
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content was not valid JSON
    #[error("JSON error in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A record in a source file could not be normalized or decoded
    #[error("Bad record in {path:?}: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: RecordError,
    },

    /// Profiles and post histories do not correspond
    #[error(transparent)]
    Integrity(#[from] DataIntegrityError),

    /// A source directory does not exist
    #[error("Source directory not found: {0:?}")]
    MissingDirectory(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn record(path: impl Into<PathBuf>, source: RecordError) -> Self {
        StoreError::Record {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::MissingDirectory(PathBuf::from("json_files/profiles"));
        assert_eq!(
            err.to_string(),
            "Source directory not found: \"json_files/profiles\""
        );

        let err: StoreError = DataIntegrityError::LengthMismatch {
            profiles: 2,
            histories: 1,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Data integrity error: 2 profiles but 1 post histories"
        );
    }

    #[test]
    fn test_io_error_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = StoreError::io("profiles/A.json", io_err);
        assert!(matches!(err, StoreError::Io { ref path, .. } if path.ends_with("A.json")));
    }
}
