use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by log segmentation.
///
/// Malformed lines and lookups that miss are not errors: they are skipped or become
/// no-ops. Only an unreadable source fails a call.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read job log {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read job log: {0}")]
    Read(#[from] std::io::Error),
}
