use color_eyre::eyre::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::cli::CliBackend;
use super::operations::Git2Backend;
use super::types::{ChangeSource, LineDelta, StatusEntry};
use crate::error::ChangeSetError;

/// Read-only queries against a working copy, plus the one mutation the commit
/// step needs.
///
/// Query errors are reported as-is; callers decide whether to degrade them.
pub trait VcsBackend {
    fn name(&self) -> &'static str;

    /// Repository root of the working tree.
    fn workdir(&self) -> &Path;

    /// Working tree vs. index.
    fn unstaged_entries(&self) -> Result<Vec<StatusEntry>>;

    /// Index vs. HEAD.
    fn staged_entries(&self) -> Result<Vec<StatusEntry>>;

    /// Files on disk that are neither tracked nor ignored.
    fn untracked_paths(&self) -> Result<Vec<String>>;

    /// Line counts for one path. `None` when the backend has nothing numeric
    /// to report (binary file, path no longer present).
    fn numstat(&self, path: &str, source: ChangeSource) -> Result<Option<LineDelta>>;

    fn staged_diff(&self) -> Result<String>;

    fn unstaged_diff(&self) -> Result<String>;

    /// Stage every change (including deletions and untracked files) and commit.
    fn commit_all(&self, message: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub enum BackendKind {
    #[default]
    Git2,
    Cli,
}

impl<'de> Deserialize<'de> for BackendKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BackendKind::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "git2" | "libgit2" => Ok(BackendKind::Git2),
            "cli" | "git" => Ok(BackendKind::Cli),
            _ => Err(format!("Invalid backend: {s}. Must be 'git2' or 'cli'")),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Git2 => write!(f, "git2"),
            BackendKind::Cli => write!(f, "cli"),
        }
    }
}

/// Locate the repository containing `dir` and open it with the chosen backend.
pub fn open_backend(
    kind: BackendKind,
    dir: &Path,
) -> std::result::Result<Box<dyn VcsBackend>, ChangeSetError> {
    let backend: Box<dyn VcsBackend> = match kind {
        BackendKind::Git2 => Box::new(Git2Backend::discover(dir)?),
        BackendKind::Cli => Box::new(CliBackend::discover(dir)?),
    };
    log::info!(
        "Opened repository at {:?} with {} backend",
        backend.workdir(),
        backend.name()
    );
    Ok(backend)
}
