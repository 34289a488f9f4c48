use std::collections::BTreeSet;
use std::fmt;

/// Which query a raw record came from. Ordered by classification precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeSource {
    Staged,
    Unstaged,
    Untracked,
}

impl fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeSource::Staged => write!(f, "staged"),
            ChangeSource::Unstaged => write!(f, "unstaged"),
            ChangeSource::Untracked => write!(f, "untracked"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    Untracked,
    /// Status code with no dedicated kind, kept verbatim.
    Other(String),
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "Added"),
            ChangeKind::Modified => write!(f, "Modified"),
            ChangeKind::Deleted => write!(f, "Deleted"),
            ChangeKind::Renamed => write!(f, "Renamed"),
            ChangeKind::Copied => write!(f, "Copied"),
            ChangeKind::Untracked => write!(f, "Untracked"),
            ChangeKind::Other(code) => write!(f, "{code}"),
        }
    }
}

/// Added/removed line counts for one path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineDelta {
    pub additions: usize,
    pub deletions: usize,
}

/// One path as reported by a status query, before numstat is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub path: String,
    pub code: String,
}

impl StatusEntry {
    pub fn new(path: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: String,
    pub status_code: String,
    pub source: ChangeSource,
    pub additions: usize,
    pub deletions: usize,
}

impl ChangeRecord {
    pub fn new(path: impl Into<String>, status_code: impl Into<String>, source: ChangeSource) -> Self {
        Self {
            path: path.into(),
            status_code: status_code.into(),
            source,
            additions: 0,
            deletions: 0,
        }
    }

    pub fn with_delta(mut self, delta: LineDelta) -> Self {
        self.additions = delta.additions;
        self.deletions = delta.deletions;
        self
    }
}

/// The single reconciled entry for a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalChange {
    pub path: String,
    pub kind: ChangeKind,
    pub additions: usize,
    pub deletions: usize,
    pub origin: BTreeSet<ChangeSource>,
}

impl CanonicalChange {
    /// Additions for display; zero counts are absent rather than shown as 0.
    pub fn shown_additions(&self) -> Option<usize> {
        (self.additions > 0).then_some(self.additions)
    }

    pub fn shown_deletions(&self) -> Option<usize> {
        (self.deletions > 0).then_some(self.deletions)
    }

    /// One-line description used when summarizing the change set.
    pub fn summary_line(&self) -> String {
        let mut line = format!("{} ({}", self.path, self.kind);
        if let Some(additions) = self.shown_additions() {
            line.push_str(&format!(", +{additions}"));
        }
        if let Some(deletions) = self.shown_deletions() {
            line.push_str(&format!(", -{deletions}"));
        }
        line.push(')');
        line
    }
}
