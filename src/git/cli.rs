//! Backend that shells out to the `git` executable.

use color_eyre::eyre::{Result, eyre};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::backend::VcsBackend;
use super::types::{ChangeSource, LineDelta, StatusEntry};
use crate::error::ChangeSetError;

#[derive(Debug, Clone)]
pub struct CliBackend {
    program: String,
    workdir: PathBuf,
}

impl CliBackend {
    pub fn discover(dir: &Path) -> std::result::Result<Self, ChangeSetError> {
        Self::discover_with(dir, "git")
    }

    /// Locate the repository using a specific git executable.
    pub fn discover_with(dir: &Path, program: &str) -> std::result::Result<Self, ChangeSetError> {
        debug!("Discovering git repository from {:?} using {}", dir, program);

        if !dir.is_dir() {
            return Err(ChangeSetError::NotARepository {
                path: dir.to_path_buf(),
            });
        }

        let output = Command::new(program)
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(dir)
            .output()
            .map_err(|e| ChangeSetError::VcsUnavailable {
                reason: format!("failed to run {program}: {e}"),
            })?;

        let toplevel = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() || toplevel.is_empty() {
            debug!(
                "rev-parse failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(ChangeSetError::NotARepository {
                path: dir.to_path_buf(),
            });
        }

        debug!("Repository discovered at: {toplevel}");
        Ok(Self {
            program: program.to_string(),
            workdir: PathBuf::from(toplevel),
        })
    }

    /// Pathspecs are always literal, so a file named `*.txt` only matches itself.
    fn run_git(&self, args: &[&str]) -> Result<String> {
        debug!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(["--literal-pathspecs", "-c", "core.quotepath=false"])
            .args(args)
            .current_dir(&self.workdir)
            .output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(eyre!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        }
    }
}

impl VcsBackend for CliBackend {
    fn name(&self) -> &'static str {
        "cli"
    }

    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn unstaged_entries(&self) -> Result<Vec<StatusEntry>> {
        let output = self.run_git(&["diff", "--name-status", "-z"])?;
        Ok(parse_name_status(&output))
    }

    fn staged_entries(&self) -> Result<Vec<StatusEntry>> {
        let output = self.run_git(&["diff", "--cached", "--name-status", "-M", "-z"])?;
        Ok(parse_name_status(&output))
    }

    fn untracked_paths(&self) -> Result<Vec<String>> {
        let output = self.run_git(&["ls-files", "--others", "--exclude-standard", "-z"])?;
        Ok(output
            .split('\0')
            .filter(|path| !path.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn numstat(&self, path: &str, source: ChangeSource) -> Result<Option<LineDelta>> {
        let output = match source {
            ChangeSource::Staged => {
                self.run_git(&["diff", "--cached", "--numstat", "-z", "--", path])?
            }
            ChangeSource::Unstaged => self.run_git(&["diff", "--numstat", "-z", "--", path])?,
            ChangeSource::Untracked => {
                return Err(eyre!("no numstat for untracked path {path}"));
            }
        };
        Ok(parse_numstat(&output))
    }

    fn staged_diff(&self) -> Result<String> {
        self.run_git(&["diff", "--cached", "--no-color", "--no-ext-diff"])
    }

    fn unstaged_diff(&self) -> Result<String> {
        self.run_git(&["diff", "--no-color", "--no-ext-diff"])
    }

    fn commit_all(&self, message: &str) -> Result<()> {
        self.run_git(&["add", "-A"])?;
        self.run_git(&["commit", "-m", message])?;
        Ok(())
    }
}

/// Parse `git diff --name-status -z` output. Each entry is a status code
/// followed by its path; renames and copies carry the source path before the
/// destination, and only the destination is kept.
pub fn parse_name_status(output: &str) -> Vec<StatusEntry> {
    let mut entries = Vec::new();
    let mut fields = output.split('\0');

    while let Some(code) = fields.next() {
        let code = code.trim();
        if code.is_empty() {
            continue;
        }
        if code.starts_with(['R', 'C']) {
            fields.next();
        }
        match fields.next() {
            Some(path) if !path.is_empty() => entries.push(StatusEntry::new(path, code)),
            _ => debug!("Skipping name-status entry {code:?} without a path"),
        }
    }

    entries
}

/// Sum `git diff --numstat -z` entries. Binary entries report `-` and count
/// as 0. Returns `None` when no entry carries a numeric result.
pub fn parse_numstat(output: &str) -> Option<LineDelta> {
    let mut delta: Option<LineDelta> = None;
    let mut fields = output.split('\0');

    while let Some(entry) = fields.next() {
        let mut parts = entry.splitn(3, '\t');
        let (Some(added), Some(deleted), Some(path)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        // renames leave the path empty and list source and destination next
        if path.is_empty() {
            fields.next();
            fields.next();
        }
        let (Ok(additions), Ok(deletions)) = (parse_count(added), parse_count(deleted)) else {
            continue;
        };

        let total = delta.get_or_insert_with(LineDelta::default);
        total.additions += additions;
        total.deletions += deletions;
    }

    delta
}

fn parse_count(token: &str) -> std::result::Result<usize, std::num::ParseIntError> {
    if token == "-" {
        Ok(0)
    } else {
        token.trim().parse()
    }
}
