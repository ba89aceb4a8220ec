use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while setting up a [`Logger`](crate::logger::Logger).
///
/// Only construction can fail. Once a logger is open, write failures are
/// swallowed so that logging never aborts the caller.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to create log directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open log file {}: {source}", .path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to update {}: {source}", .path.display())]
    Gitignore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LoggerError>;
