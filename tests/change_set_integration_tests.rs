use color_eyre::eyre::Result;
use git2::Repository;
use gitsync::git::{self, BackendKind, DEFAULT_MAX_TRANSCRIPT_CHARS};
use gitsync::{ChangeKind, ChangeSetError, ChangeSource};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn create_test_repo() -> Result<(TempDir, Repository)> {
    let temp_dir = TempDir::new()?;
    let repo = Repository::init(temp_dir.path())?;

    let mut config = repo.config()?;
    config.set_str("user.name", "Test User")?;
    config.set_str("user.email", "test@example.com")?;

    Ok((temp_dir, repo))
}

fn stage(repo: &Repository, filename: &str) -> Result<()> {
    let mut index = repo.index()?;
    index.add_path(Path::new(filename))?;
    index.write()?;
    Ok(())
}

fn commit_files(repo: &Repository, files: &[(&str, &str)], message: &str) -> Result<()> {
    let workdir = repo.workdir().unwrap().to_path_buf();
    for (name, content) in files {
        fs::write(workdir.join(name), content)?;
        stage(repo, name)?;
    }

    let mut index = repo.index()?;
    let tree = repo.find_tree(index.write_tree()?)?;
    let signature = git2::Signature::now("Test User", "test@example.com")?;
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
    Ok(())
}

/// Working copy with one file in every interesting state:
/// - `added.txt`: staged new file with further unstaged edits
/// - `edited.txt`: unstaged modification
/// - `removed.txt`: staged deletion
/// - `fresh.txt`: untracked
fn mixed_working_copy() -> Result<(TempDir, Repository)> {
    let (temp_dir, repo) = create_test_repo()?;
    let root = temp_dir.path();
    commit_files(
        &repo,
        &[("edited.txt", "a\nb\nc\n"), ("removed.txt", "x\ny\n")],
        "Initial commit",
    )?;

    fs::write(root.join("added.txt"), "1\n2\n3\n4\n5\n")?;
    stage(&repo, "added.txt")?;
    fs::write(root.join("added.txt"), "1\n2\n3\n4\nfive\nsix\n")?;

    fs::write(root.join("edited.txt"), "a\nBB\nc\n")?;

    fs::remove_file(root.join("removed.txt"))?;
    let mut index = repo.index()?;
    index.remove_path(Path::new("removed.txt"))?;
    index.write()?;

    fs::write(root.join("fresh.txt"), "new\n")?;

    Ok((temp_dir, repo))
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn check_mixed_change_set(kind: BackendKind) -> Result<()> {
    let (temp_dir, _repo) = mixed_working_copy()?;
    let backend = git::open_backend(kind, temp_dir.path())?;

    let records = git::list_working_tree_changes(backend.as_ref());
    let mut changes = git::reconcile(&records)?;
    changes.sort_by(|a, b| a.path.cmp(&b.path));

    let summary: Vec<(&str, ChangeKind, usize, usize)> = changes
        .iter()
        .map(|c| (c.path.as_str(), c.kind.clone(), c.additions, c.deletions))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("added.txt", ChangeKind::Added, 7, 1),
            ("edited.txt", ChangeKind::Modified, 1, 1),
            ("fresh.txt", ChangeKind::Untracked, 0, 0),
            ("removed.txt", ChangeKind::Deleted, 0, 2),
        ]
    );

    assert_eq!(
        changes[0].origin,
        BTreeSet::from([ChangeSource::Staged, ChangeSource::Unstaged])
    );
    assert_eq!(changes[2].origin, BTreeSet::from([ChangeSource::Untracked]));
    Ok(())
}

#[test]
fn test_git2_backend_reconciles_mixed_working_copy() -> Result<()> {
    check_mixed_change_set(BackendKind::Git2)
}

#[test]
fn test_cli_backend_reconciles_mixed_working_copy() -> Result<()> {
    if !git_available() {
        eprintln!("git executable not found, skipping");
        return Ok(());
    }
    check_mixed_change_set(BackendKind::Cli)
}

type ChangeSummary = Vec<(String, ChangeKind, usize, usize)>;

fn change_summary(kind: BackendKind, dir: &Path) -> Result<ChangeSummary> {
    let backend = git::open_backend(kind, dir)?;
    let mut changes = git::reconcile(&git::list_working_tree_changes(backend.as_ref()))?;
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(changes
        .into_iter()
        .map(|c| (c.path, c.kind, c.additions, c.deletions))
        .collect())
}

/// Both backends must agree on the change set, and it must match `expected`.
fn assert_backends_agree(
    dir: &Path,
    expected: &[(&str, ChangeKind, usize, usize)],
) -> Result<()> {
    let expected: ChangeSummary = expected
        .iter()
        .map(|(path, kind, additions, deletions)| {
            (path.to_string(), kind.clone(), *additions, *deletions)
        })
        .collect();

    assert_eq!(change_summary(BackendKind::Git2, dir)?, expected);
    if git_available() {
        assert_eq!(change_summary(BackendKind::Cli, dir)?, expected);
    } else {
        eprintln!("git executable not found, skipping cli backend");
    }
    Ok(())
}

#[test]
fn test_backends_agree_on_rename_then_edit() -> Result<()> {
    let (temp_dir, repo) = create_test_repo()?;
    let root = temp_dir.path();
    let original: String = (1..=10).map(|i| format!("line {i}\n")).collect();
    commit_files(&repo, &[("old.txt", original.as_str())], "Initial commit")?;

    fs::rename(root.join("old.txt"), root.join("new.txt"))?;
    let mut index = repo.index()?;
    index.remove_path(Path::new("old.txt"))?;
    index.add_path(Path::new("new.txt"))?;
    index.write()?;
    fs::write(root.join("new.txt"), format!("{original}line 11\n"))?;

    let summary = change_summary(BackendKind::Git2, root)?;
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].0, "new.txt");
    assert_eq!(summary[0].1, ChangeKind::Renamed);

    if git_available() {
        assert_eq!(change_summary(BackendKind::Cli, root)?, summary);
    }
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_backends_agree_on_glob_like_file_names() -> Result<()> {
    let (temp_dir, repo) = create_test_repo()?;
    let root = temp_dir.path();
    commit_files(
        &repo,
        &[("a.txt", "a\n"), ("b.txt", "b\n"), ("*.txt", "star\n")],
        "Initial commit",
    )?;

    fs::write(root.join("a.txt"), "a\nmore\n")?;
    fs::write(root.join("b.txt"), "b\nmore\n")?;
    fs::write(root.join("*.txt"), "star\nmore\n")?;

    assert_backends_agree(
        root,
        &[
            ("*.txt", ChangeKind::Modified, 1, 0),
            ("a.txt", ChangeKind::Modified, 1, 0),
            ("b.txt", ChangeKind::Modified, 1, 0),
        ],
    )
}

#[cfg(unix)]
#[test]
fn test_backends_agree_on_quoted_file_names() -> Result<()> {
    let (temp_dir, repo) = create_test_repo()?;
    let root = temp_dir.path();
    commit_files(&repo, &[("say\"hi\".txt", "one\ntwo\n")], "Initial commit")?;

    fs::write(root.join("say\"hi\".txt"), "one\nTWO!\nthree\n")?;
    fs::write(root.join("tab\there.txt"), "untracked\n")?;
    fs::write(root.join("back\\slash.txt"), "staged\n")?;
    stage(&repo, "back\\slash.txt")?;

    assert_backends_agree(
        root,
        &[
            ("back\\slash.txt", ChangeKind::Added, 1, 0),
            ("say\"hi\".txt", ChangeKind::Modified, 2, 1),
            ("tab\there.txt", ChangeKind::Untracked, 0, 0),
        ],
    )
}

#[test]
fn test_cli_backend_missing_directory_is_not_a_repository() {
    let temp_dir = TempDir::new().unwrap();

    let result = git::open_backend(BackendKind::Cli, &temp_dir.path().join("gone"));

    assert!(matches!(result, Err(ChangeSetError::NotARepository { .. })));
}

#[test]
fn test_change_set_order_follows_queries() -> Result<()> {
    let (temp_dir, _repo) = mixed_working_copy()?;
    let backend = git::open_backend(BackendKind::Git2, temp_dir.path())?;

    let changes = git::reconcile(&git::list_working_tree_changes(backend.as_ref()))?;
    let paths: Vec<&str> = changes.iter().map(|c| c.path.as_str()).collect();

    // unstaged first, then staged-only paths, then untracked
    assert_eq!(paths, vec!["added.txt", "edited.txt", "removed.txt", "fresh.txt"]);
    Ok(())
}

#[test]
fn test_reading_twice_is_stable() -> Result<()> {
    let (temp_dir, _repo) = mixed_working_copy()?;
    let backend = git::open_backend(BackendKind::Git2, temp_dir.path())?;

    let first = git::reconcile(&git::list_working_tree_changes(backend.as_ref()))?;
    let second = git::reconcile(&git::list_working_tree_changes(backend.as_ref()))?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_clean_working_copy_has_no_changes() -> Result<()> {
    let (temp_dir, repo) = create_test_repo()?;
    commit_files(&repo, &[("readme.md", "hello\n")], "Initial commit")?;
    let backend = git::open_backend(BackendKind::Git2, temp_dir.path())?;

    let changes = git::reconcile(&git::list_working_tree_changes(backend.as_ref()))?;

    assert!(changes.is_empty());
    assert_eq!(
        git::assemble_transcript(backend.as_ref(), DEFAULT_MAX_TRANSCRIPT_CHARS),
        ""
    );
    Ok(())
}

#[test]
fn test_transcript_sections() -> Result<()> {
    let (temp_dir, _repo) = mixed_working_copy()?;
    let backend = git::open_backend(BackendKind::Git2, temp_dir.path())?;

    let transcript = git::assemble_transcript(backend.as_ref(), DEFAULT_MAX_TRANSCRIPT_CHARS);

    let staged = transcript.find("Staged changes:\n").unwrap();
    let unstaged = transcript.find("Unstaged changes:\n").unwrap();
    let untracked = transcript.find("New untracked files:\nfresh.txt\n").unwrap();
    assert!(staged < unstaged && unstaged < untracked);
    assert!(transcript.contains("+++ b/added.txt"));
    assert!(transcript.contains("-b\n+BB\n"));
    Ok(())
}

#[test]
fn test_transcript_respects_limit() -> Result<()> {
    let (temp_dir, repo) = create_test_repo()?;
    let big: String = (0..2000).map(|i| format!("line {i}\n")).collect();
    commit_files(&repo, &[("big.txt", "start\n")], "Initial commit")?;
    fs::write(temp_dir.path().join("big.txt"), &big)?;
    let backend = git::open_backend(BackendKind::Git2, temp_dir.path())?;

    let transcript = git::assemble_transcript(backend.as_ref(), DEFAULT_MAX_TRANSCRIPT_CHARS);

    assert_eq!(transcript.chars().count(), DEFAULT_MAX_TRANSCRIPT_CHARS);
    assert!(transcript.starts_with("Unstaged changes:\n"));
    Ok(())
}

#[test]
fn test_open_backend_outside_repository() {
    let temp_dir = TempDir::new().unwrap();

    let result = git::open_backend(BackendKind::Git2, temp_dir.path());

    assert!(matches!(result, Err(ChangeSetError::NotARepository { .. })));
}
