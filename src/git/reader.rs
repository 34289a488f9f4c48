use log::debug;

use super::backend::VcsBackend;
use super::types::{ChangeRecord, ChangeSource, StatusEntry};

/// Collect raw change records from the unstaged, staged and untracked queries,
/// in that order.
///
/// Numstat is attached to every tracked record. A query that fails yields no
/// records (or zero counts) instead of aborting the read.
pub fn list_working_tree_changes(backend: &dyn VcsBackend) -> Vec<ChangeRecord> {
    let mut records = Vec::new();

    for source in [ChangeSource::Unstaged, ChangeSource::Staged] {
        let entries = match source {
            ChangeSource::Staged => backend.staged_entries(),
            _ => backend.unstaged_entries(),
        };
        let entries = entries.unwrap_or_else(|e| {
            debug!("{source} status query failed: {e}");
            Vec::new()
        });

        records.extend(
            entries
                .into_iter()
                .map(|entry| tracked_record(backend, entry, source)),
        );
    }

    let untracked = backend.untracked_paths().unwrap_or_else(|e| {
        debug!("untracked query failed: {e}");
        Vec::new()
    });
    records.extend(
        untracked
            .into_iter()
            .map(|path| ChangeRecord::new(path, "??", ChangeSource::Untracked)),
    );

    debug!("Read {} raw change records", records.len());
    records
}

fn tracked_record(backend: &dyn VcsBackend, entry: StatusEntry, source: ChangeSource) -> ChangeRecord {
    let record = ChangeRecord::new(entry.path, entry.code, source);

    match backend.numstat(&record.path, source) {
        Ok(Some(delta)) => record.with_delta(delta),
        Ok(None) => record,
        Err(e) => {
            debug!("{source} numstat for {} failed: {e}", record.path);
            record
        }
    }
}
