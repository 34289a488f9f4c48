//! Collapses raw change records into one canonical entry per path.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use super::classify::{classify, precedence};
use super::types::{CanonicalChange, ChangeRecord, ChangeSource};
use crate::error::ChangeSetError;

struct Group<'a> {
    path: &'a str,
    lead: &'a ChangeRecord,
    additions: usize,
    deletions: usize,
    origin: BTreeSet<ChangeSource>,
}

/// Merge records sharing a path.
///
/// Output follows first-observed path order. The kind comes from the
/// highest-precedence record (staged, then unstaged, then untracked), line
/// deltas are summed once per contributing source, and untracked records
/// never carry deltas.
pub fn reconcile(records: &[ChangeRecord]) -> Result<Vec<CanonicalChange>, ChangeSetError> {
    let mut groups: Vec<Group> = Vec::new();
    let mut by_path: HashMap<&str, usize> = HashMap::new();

    for record in records {
        if record.path.is_empty() {
            return Err(ChangeSetError::MalformedRecord {
                origin: record.source,
            });
        }

        let index = *by_path.entry(record.path.as_str()).or_insert_with(|| {
            groups.push(Group {
                path: &record.path,
                lead: record,
                additions: 0,
                deletions: 0,
                origin: BTreeSet::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[index];

        if precedence(record.source) < precedence(group.lead.source) {
            group.lead = record;
        }

        if !group.origin.insert(record.source) {
            debug!(
                "Ignoring stats from repeated {} record for {}",
                record.source, record.path
            );
            continue;
        }

        if record.source != ChangeSource::Untracked {
            group.additions += record.additions;
            group.deletions += record.deletions;
        }
    }

    debug!(
        "Reconciled {} raw records into {} changes",
        records.len(),
        groups.len()
    );

    Ok(groups
        .into_iter()
        .map(|group| CanonicalChange {
            path: group.path.to_string(),
            kind: classify(&group.lead.status_code, group.lead.source),
            additions: group.additions,
            deletions: group.deletions,
            origin: group.origin,
        })
        .collect())
}
