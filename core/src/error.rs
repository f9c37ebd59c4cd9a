//! Core error types and utilities

use std::path::PathBuf;
use thiserror::Error;

/// Core-specific error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// The target executable could not be resolved at spawn time. This is
    /// unrecoverable for a supervision session: the caller is expected to
    /// abort the whole program.
    #[error("executable '{0}' not found")]
    MissingExecutable(String),

    #[error("failed to spawn process: {0}")]
    ProcessSpawn(String),

    #[error("failed to wait for process: {0}")]
    ProcessWait(String),

    #[error("failed to signal process: {0}")]
    ProcessSignal(String),

    /// Deleting the backing file of a resource handle failed for a reason
    /// other than the file being already gone.
    #[error("failed to release '{path}': {source}")]
    ResourceRelease {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("initialization error: {0}")]
    InitializationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Core-specific result type
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_names_the_target() {
        let err = CoreError::MissingExecutable("build/bin/muxing".to_string());
        assert_eq!(err.to_string(), "executable 'build/bin/muxing' not found");
    }

    #[test]
    fn release_error_names_the_path() {
        let err = CoreError::ResourceRelease {
            path: PathBuf::from("/tmp/x.mp4"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/x.mp4"));
    }
}
