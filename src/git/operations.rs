//! libgit2 backend for the change-set queries.

use color_eyre::eyre::{Result, eyre};
use git2::{
    Diff, DiffFormat, DiffOptions, ErrorCode, IndexAddOption, Repository, Status, StatusOptions,
    StatusShow, Tree,
};
use log::debug;
use std::path::{Path, PathBuf};

use super::backend::VcsBackend;
use super::types::{ChangeSource, LineDelta, StatusEntry};
use crate::error::ChangeSetError;

pub struct Git2Backend {
    repo: Repository,
    workdir: PathBuf,
}

impl std::fmt::Debug for Git2Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git2Backend")
            .field("workdir", &self.workdir)
            .finish()
    }
}

impl Git2Backend {
    /// Search upward from `dir` for a repository with a working tree.
    pub fn discover(dir: &Path) -> std::result::Result<Self, ChangeSetError> {
        debug!("Discovering git repository from {:?} using git2", dir);

        let repo = Repository::discover(dir).map_err(|e| match e.code() {
            ErrorCode::NotFound => ChangeSetError::NotARepository {
                path: dir.to_path_buf(),
            },
            _ => ChangeSetError::VcsUnavailable {
                reason: e.message().to_string(),
            },
        })?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| ChangeSetError::NotARepository {
                path: dir.to_path_buf(),
            })?
            .to_path_buf();

        debug!("Repository discovered at: {:?}", workdir);
        Ok(Self { repo, workdir })
    }

    fn head_tree(&self) -> Option<Tree<'_>> {
        self.repo.head().ok().and_then(|head| head.peel_to_tree().ok())
    }

    fn entries(&self, source: ChangeSource) -> Result<Vec<StatusEntry>> {
        let show = match source {
            ChangeSource::Staged => StatusShow::Index,
            _ => StatusShow::Workdir,
        };
        let mut options = StatusOptions::new();
        options
            .show(show)
            .include_untracked(false)
            .include_ignored(false)
            .renames_head_to_index(true)
            .renames_index_to_workdir(true);

        let statuses = self.repo.statuses(Some(&mut options))?;
        debug!("Found {} {source} status entries", statuses.len());

        let mut entries = Vec::new();
        for entry in statuses.iter() {
            let status = entry.status();
            let code = match source {
                ChangeSource::Staged => index_code(status),
                _ => workdir_code(status),
            };
            let (Some(code), Some(path)) = (code, entry_path(&entry, source)) else {
                continue;
            };
            entries.push(StatusEntry::new(path, code));
        }

        Ok(entries)
    }

    fn path_diff(&self, path: &str, source: ChangeSource) -> Result<Diff<'_>> {
        let mut options = DiffOptions::new();
        options.pathspec(path).disable_pathspec_match(true);

        let diff = match source {
            ChangeSource::Staged => {
                let head = self.head_tree();
                self.repo
                    .diff_tree_to_index(head.as_ref(), None, Some(&mut options))?
            }
            ChangeSource::Unstaged => self.repo.diff_index_to_workdir(None, Some(&mut options))?,
            ChangeSource::Untracked => {
                return Err(eyre!("no numstat for untracked path {path}"));
            }
        };
        Ok(diff)
    }
}

impl VcsBackend for Git2Backend {
    fn name(&self) -> &'static str {
        "git2"
    }

    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn unstaged_entries(&self) -> Result<Vec<StatusEntry>> {
        self.entries(ChangeSource::Unstaged)
    }

    fn staged_entries(&self) -> Result<Vec<StatusEntry>> {
        self.entries(ChangeSource::Staged)
    }

    fn untracked_paths(&self) -> Result<Vec<String>> {
        let statuses = self.repo.statuses(Some(
            StatusOptions::new()
                .show(StatusShow::Workdir)
                .include_untracked(true)
                .recurse_untracked_dirs(true)
                .include_ignored(false),
        ))?;

        Ok(statuses
            .iter()
            .filter(|entry| entry.status().is_wt_new())
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect())
    }

    fn numstat(&self, path: &str, source: ChangeSource) -> Result<Option<LineDelta>> {
        let diff = self.path_diff(path, source)?;
        if diff.deltas().count() == 0 {
            debug!("No {source} delta for {path}");
            return Ok(None);
        }

        let stats = diff.stats()?;
        Ok(Some(LineDelta {
            additions: stats.insertions(),
            deletions: stats.deletions(),
        }))
    }

    fn staged_diff(&self) -> Result<String> {
        let head = self.head_tree();
        let diff = self.repo.diff_tree_to_index(head.as_ref(), None, None)?;
        patch_text(&diff)
    }

    fn unstaged_diff(&self) -> Result<String> {
        let diff = self.repo.diff_index_to_workdir(None, None)?;
        patch_text(&diff)
    }

    fn commit_all(&self, message: &str) -> Result<()> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.repo.signature()?;

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let commit_id = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;
        debug!("Created commit {commit_id}");
        Ok(())
    }
}

fn index_code(status: Status) -> Option<&'static str> {
    if status.is_index_renamed() {
        Some("R")
    } else if status.is_index_new() {
        Some("A")
    } else if status.is_index_modified() {
        Some("M")
    } else if status.is_index_deleted() {
        Some("D")
    } else if status.is_index_typechange() {
        Some("T")
    } else if status.is_conflicted() {
        Some("U")
    } else {
        None
    }
}

fn workdir_code(status: Status) -> Option<&'static str> {
    if status.is_wt_renamed() {
        Some("R")
    } else if status.is_wt_modified() {
        Some("M")
    } else if status.is_wt_deleted() {
        Some("D")
    } else if status.is_wt_typechange() {
        Some("T")
    } else if status.is_conflicted() {
        Some("U")
    } else {
        None
    }
}

/// Destination path of an entry, so renames key on where the file lives now.
fn entry_path(entry: &git2::StatusEntry<'_>, source: ChangeSource) -> Option<String> {
    let delta = match source {
        ChangeSource::Staged => entry.head_to_index(),
        _ => entry.index_to_workdir(),
    };
    delta
        .and_then(|d| d.new_file().path().map(|p| p.to_string_lossy().into_owned()))
        .or_else(|| entry.path().map(str::to_string))
}

/// Render a diff as unified patch text.
fn patch_text(diff: &Diff) -> Result<String> {
    let mut text = String::new();

    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if matches!(origin, ' ' | '+' | '-') {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;

    Ok(text)
}
