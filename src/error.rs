use std::path::PathBuf;
use thiserror::Error;

use crate::git::ChangeSource;

/// Failures that cross the change-set boundary and end the run.
///
/// Finer-grained query failures never show up here; the reader degrades them
/// to empty results instead.
#[derive(Debug, Error)]
pub enum ChangeSetError {
    #[error("not a git repository (or any of the parent directories): {}", .path.display())]
    NotARepository { path: PathBuf },
    #[error("version control tool unavailable: {reason}")]
    VcsUnavailable { reason: String },
    #[error("malformed {origin} change record: empty path")]
    MalformedRecord { origin: ChangeSource },
}
