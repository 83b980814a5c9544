//! Error types for workspace I/O operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from filesystem-facing workspace operations.
///
/// Analysis-level findings are never errors; they travel as diagnostics.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A library root handed to the bulk loader does not exist.
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// IO failure reading a file or directory.
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
