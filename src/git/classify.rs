use super::types::{ChangeKind, ChangeSource};

/// Map a raw status code to a change kind.
///
/// Accepts single-letter codes (`M`), scored rename/copy codes (`R100`) and
/// porcelain `XY` pairs, where staged records read column X and unstaged
/// records read column Y. Untracked records are always `Untracked`.
pub fn classify(code: &str, source: ChangeSource) -> ChangeKind {
    if source == ChangeSource::Untracked || code == "??" {
        return ChangeKind::Untracked;
    }

    match status_letter(code, source) {
        Some('A') => ChangeKind::Added,
        Some('M') | Some('T') => ChangeKind::Modified,
        Some('D') => ChangeKind::Deleted,
        Some('R') => ChangeKind::Renamed,
        Some('C') => ChangeKind::Copied,
        _ => ChangeKind::Other(code.to_string()),
    }
}

/// Rank used when several records describe the same path; lower wins.
pub fn precedence(source: ChangeSource) -> u8 {
    match source {
        ChangeSource::Staged => 0,
        ChangeSource::Unstaged => 1,
        ChangeSource::Untracked => 2,
    }
}

fn status_letter(code: &str, source: ChangeSource) -> Option<char> {
    let chars: Vec<char> = code.chars().collect();
    match chars.as_slice() {
        [letter] => Some(*letter),
        [letter, rest @ ..] if rest.iter().all(|c| c.is_ascii_digit()) => Some(*letter),
        [x, y] => {
            let column = if source == ChangeSource::Staged { *x } else { *y };
            (column != ' ' && column != '.').then_some(column)
        }
        _ => None,
    }
}
