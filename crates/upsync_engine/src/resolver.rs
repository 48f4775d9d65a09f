//! Eligibility classification.
//!
//! Decides, once per run, which dirty records actually need to be pushed.

use crate::error::SyncUpResult;
use crate::target::RemoteTarget;
use upsync_model::{EligibilityMap, MergeMode, Record, RemoteModInfo};

/// Classifies `records` into an [`EligibilityMap`] for one run.
///
/// In overwrite mode every record is eligible and no remote lookup is
/// performed. In leave-if-changed mode a single modification-info lookup over
/// the full set decides, per record, whether the local copy wins; a lookup
/// failure aborts the run before any upload.
pub fn classify(
    target: &dyn RemoteTarget,
    records: &[Record],
    merge_mode: MergeMode,
) -> SyncUpResult<EligibilityMap> {
    match merge_mode {
        MergeMode::Overwrite => Ok(records
            .iter()
            .map(|record| (record.id.clone(), true))
            .collect()),
        MergeMode::LeaveIfChanged => {
            let remote_infos = target.lookup_modification_info(records)?;
            Ok(records
                .iter()
                .map(|record| {
                    let eligible = newer_than_remote(record, remote_infos.get(&record.id));
                    (record.id.clone(), eligible)
                })
                .collect())
        }
    }
}

/// Returns true if the local record wins over its remote counterpart.
///
/// The local copy wins when the remote has no counterpart, when either
/// modification timestamp is unknown, when both sides deleted the record, or
/// when the local timestamp is strictly newer.
pub fn newer_than_remote(record: &Record, remote: Option<&RemoteModInfo>) -> bool {
    let Some(remote) = remote else {
        return true;
    };
    if record.is_locally_deleted() && remote.deleted {
        return true;
    }
    match (record.modified_at, remote.modified_at) {
        (Some(local), Some(remote)) => local > remote,
        // An unknown timestamp on either side cannot prove the remote is newer.
        _ => true,
    }
}
