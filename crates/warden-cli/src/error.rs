//! Error types for warden-cli

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for warden-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in warden-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Configuration could not be loaded, parsed, or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O failed
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Error from warden-acl (bad action, kind, or principal)
    #[error("ACL error: {0}")]
    Acl(#[from] warden_acl::AccessError),

    /// Error from warden-api
    #[error("API error: {0}")]
    Api(#[from] warden_api::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Wrap an I/O error with the path it concerns.
    pub fn io_with_path(source: std::io::Error, path: &Path) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
