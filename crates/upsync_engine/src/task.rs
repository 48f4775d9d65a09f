//! The sync-up orchestrator.

use crate::batcher::Batcher;
use crate::config::SyncUpConfig;
use crate::error::{SyncUpError, SyncUpResult};
use crate::progress::{percent, ProgressSink, ProgressTracker, StopSignal};
use crate::resolver;
use crate::store::LocalStore;
use crate::target::{BatchUpload, RemoteTarget};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use upsync_model::{EligibilityMap, LocalChange, Record, RecordId, SyncRunState, SyncStatus};

/// How a run exited when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every record was processed.
    Completed,
    /// A stop request was observed; remaining records were not processed.
    Stopped,
}

/// Result of a completed or stopped run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// How the run exited.
    pub outcome: RunOutcome,
    /// Records iterated over, eligible or not.
    pub records_processed: usize,
    /// Records handed to the remote target.
    pub records_uploaded: usize,
    /// Upload calls made (batches, or single pushes on the per-record path).
    pub upload_calls: usize,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

/// Counters for one run, readable mid-run and after a failure.
#[derive(Debug, Clone, Default)]
pub struct SyncUpStats {
    /// Records iterated over, eligible or not.
    pub records_processed: usize,
    /// Records handed to the remote target.
    pub records_uploaded: usize,
    /// Upload calls made.
    pub upload_calls: usize,
    /// Message of the error that ended the run, if any.
    pub last_error: Option<String>,
}

/// Drives one sync-up run end to end.
///
/// Loads dirty records, classifies them against the merge policy, groups the
/// eligible ones into batches (or pushes them one at a time when the target
/// has no batch capability), uploads, and reports progress. One task handles
/// exactly one run; create a new task for the next run.
pub struct SyncUpTask<S: LocalStore, T: RemoteTarget> {
    config: SyncUpConfig,
    store: Arc<S>,
    target: Arc<T>,
    state: RwLock<SyncRunState>,
    stats: RwLock<SyncUpStats>,
    stop: StopSignal,
}

impl<S: LocalStore, T: RemoteTarget> SyncUpTask<S, T> {
    /// Creates a task for one run.
    pub fn new(config: SyncUpConfig, store: S, target: T) -> Self {
        Self {
            config,
            store: Arc::new(store),
            target: Arc::new(target),
            state: RwLock::new(SyncRunState::new()),
            stats: RwLock::new(SyncUpStats::default()),
            stop: StopSignal::new(),
        }
    }

    /// Snapshot of the run state.
    pub fn state(&self) -> SyncRunState {
        *self.state.read()
    }

    /// Snapshot of the run counters.
    pub fn stats(&self) -> SyncUpStats {
        self.stats.read().clone()
    }

    /// Handle for requesting a cooperative stop from another thread.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Runs the sync up over `dirty_ids`.
    ///
    /// Returns a report on completion or stop; errors carry the failing
    /// stage. Batches committed before a failure remain committed. The run
    /// ends with status `Running` on success; callers finalize with
    /// [`mark_done`](SyncUpTask::mark_done).
    pub fn run(&self, dirty_ids: &[RecordId], sink: &dyn ProgressSink) -> SyncUpResult<RunReport> {
        let start = Instant::now();
        self.transition(SyncStatus::Running)?;
        sink.on_update(SyncStatus::Running, 0);
        debug!(
            collection = %self.config.collection,
            total = dirty_ids.len(),
            merge_mode = self.config.options.merge_mode.as_str(),
            "starting sync up"
        );

        let records = match self.store.load_by_ids(&self.config.collection, dirty_ids) {
            Ok(records) => records,
            Err(e) => return Err(self.fail(e, sink)),
        };

        let eligibility = match resolver::classify(
            self.target.as_ref(),
            &records,
            self.config.options.merge_mode,
        ) {
            Ok(map) => map,
            Err(e) => return Err(self.fail(e, sink)),
        };
        debug!(
            eligible = eligibility.eligible_count(),
            total = records.len(),
            "classified dirty records"
        );

        let outcome = match self.target.batch_capability() {
            Some(capability) => self.run_batched(&records, &eligibility, capability, sink),
            None => self.run_per_record(&records, &eligibility, sink),
        };

        match outcome {
            Ok(outcome) => {
                if outcome == RunOutcome::Stopped {
                    self.transition(SyncStatus::Stopped)?;
                    sink.on_update(SyncStatus::Stopped, self.state().progress);
                    info!("sync up stopped on request");
                }
                let stats = self.stats();
                Ok(RunReport {
                    outcome,
                    records_processed: stats.records_processed,
                    records_uploaded: stats.records_uploaded,
                    upload_calls: stats.upload_calls,
                    duration: start.elapsed(),
                })
            }
            Err(e) => Err(self.fail(e, sink)),
        }
    }

    /// Finalizes a completed run: status `Done`, progress 100.
    ///
    /// The run loop itself never reports 100; this is the caller's explicit
    /// completion step after [`run`](SyncUpTask::run) returns `Completed`.
    pub fn mark_done(&self, sink: &dyn ProgressSink) -> SyncUpResult<()> {
        self.transition(SyncStatus::Done)?;
        self.state.write().set_progress(100);
        sink.on_update(SyncStatus::Done, 100);
        info!("sync up done");
        Ok(())
    }

    fn run_batched(
        &self,
        records: &[Record],
        eligibility: &EligibilityMap,
        capability: &dyn BatchUpload,
        sink: &dyn ProgressSink,
    ) -> SyncUpResult<RunOutcome> {
        let capacity = capability.max_batch_size();
        if capacity == 0 {
            return Err(SyncUpError::InvalidBatchSize(capacity));
        }

        let total = records.len();
        let mut batcher = Batcher::new(capacity);
        let mut tracker = ProgressTracker::new();

        for (i, record) in records.iter().enumerate() {
            if self.stop.is_stop_requested() {
                // The partially accumulated batch is dropped; its records stay
                // dirty and are reconsidered on the next run.
                return Ok(RunOutcome::Stopped);
            }

            if eligibility.is_eligible(&record.id) {
                batcher.push(record.clone());
            }

            if batcher.is_full() || i == total - 1 {
                if let Some(group) = batcher.take() {
                    let size = group.len();
                    if let Err(e) = capability.upload_batch(
                        &group,
                        self.config.options.fieldlist(),
                        self.config.options.merge_mode,
                        &self.config.collection,
                    ) {
                        self.note_processed_through(i, total);
                        return Err(e);
                    }
                    let mut stats = self.stats.write();
                    stats.upload_calls += 1;
                    stats.records_uploaded += size;
                    debug!(batch_size = size, "uploaded batch");
                }
            }

            self.finish_iteration(i, total, &mut tracker, sink);
        }

        Ok(RunOutcome::Completed)
    }

    fn run_per_record(
        &self,
        records: &[Record],
        eligibility: &EligibilityMap,
        sink: &dyn ProgressSink,
    ) -> SyncUpResult<RunOutcome> {
        let total = records.len();
        let mut tracker = ProgressTracker::new();
        let fieldlist = self.config.options.fieldlist();
        let collection = &self.config.collection;

        for (i, record) in records.iter().enumerate() {
            if self.stop.is_stop_requested() {
                return Ok(RunOutcome::Stopped);
            }

            if eligibility.is_eligible(&record.id) {
                let pushed = match record.change {
                    LocalChange::Created => self.target.create_record(record, fieldlist, collection),
                    LocalChange::Updated => self.target.update_record(record, fieldlist, collection),
                    LocalChange::Deleted => self.target.delete_record(record, collection),
                };
                if let Err(e) = pushed {
                    self.note_processed_through(i, total);
                    return Err(e);
                }
                let mut stats = self.stats.write();
                stats.upload_calls += 1;
                stats.records_uploaded += 1;
            }

            self.finish_iteration(i, total, &mut tracker, sink);
        }

        Ok(RunOutcome::Completed)
    }

    /// Books iteration `i` as processed and relays progress.
    fn finish_iteration(
        &self,
        i: usize,
        total: usize,
        tracker: &mut ProgressTracker,
        sink: &dyn ProgressSink,
    ) {
        self.stats.write().records_processed = i + 1;
        if let Some(value) = tracker.advance(i + 1, total, sink) {
            self.state.write().set_progress(value);
        }
    }

    /// On an upload failure at index `i`, progress covers the failed batch's
    /// last record so callers can read "synced up through record k".
    fn note_processed_through(&self, i: usize, total: usize) {
        self.stats.write().records_processed = i + 1;
        self.state.write().set_progress(percent(i + 1, total));
    }

    fn transition(&self, next: SyncStatus) -> SyncUpResult<()> {
        let mut state = self.state.write();
        if !state.status.can_transition_to(next) {
            return Err(SyncUpError::InvalidStateTransition {
                from: format!("{:?}", state.status),
                to: format!("{next:?}"),
            });
        }
        state.status = next;
        Ok(())
    }

    fn fail(&self, error: SyncUpError, sink: &dyn ProgressSink) -> SyncUpError {
        warn!(stage = ?error.stage(), %error, "sync up failed");
        self.stats.write().last_error = Some(error.to_string());
        let progress = {
            let mut state = self.state.write();
            state.status = SyncStatus::Failed;
            state.progress
        };
        sink.on_update(SyncStatus::Failed, progress);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordingSink;
    use crate::store::MemoryStore;
    use crate::target::MockRemoteTarget;
    use upsync_model::MergeMode;

    fn store_with(ids: &[&str]) -> (MemoryStore, Vec<RecordId>) {
        let store = MemoryStore::new();
        let mut dirty = Vec::new();
        for (n, id) in ids.iter().enumerate() {
            store.put(Record::updated(*id, serde_json::Map::new(), n as i64));
            dirty.push(RecordId::from(*id));
        }
        (store, dirty)
    }

    #[test]
    fn initial_state_is_new() {
        let (store, _) = store_with(&[]);
        let task = SyncUpTask::new(
            SyncUpConfig::new("accounts"),
            store,
            MockRemoteTarget::with_batch_capacity(2),
        );
        assert_eq!(task.state().status, SyncStatus::New);
        assert_eq!(task.state().progress, 0);
        assert_eq!(task.stats().records_processed, 0);
    }

    #[test]
    fn empty_input_completes_immediately() {
        let (store, dirty) = store_with(&[]);
        let task = SyncUpTask::new(
            SyncUpConfig::new("accounts"),
            store,
            MockRemoteTarget::with_batch_capacity(2),
        );
        let sink = RecordingSink::new();

        let report = task.run(&dirty, &sink).unwrap();
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.records_processed, 0);
        assert_eq!(report.upload_calls, 0);
        assert_eq!(sink.updates(), vec![(SyncStatus::Running, 0)]);

        task.mark_done(&sink).unwrap();
        assert_eq!(task.state().status, SyncStatus::Done);
        assert_eq!(task.state().progress, 100);
        assert_eq!(sink.last_status(), Some(SyncStatus::Done));
    }

    #[test]
    fn run_is_single_use() {
        let (store, dirty) = store_with(&["a"]);
        let task = SyncUpTask::new(
            SyncUpConfig::new("accounts"),
            store,
            MockRemoteTarget::with_batch_capacity(2),
        );
        let sink = RecordingSink::new();

        task.run(&dirty, &sink).unwrap();
        task.mark_done(&sink).unwrap();

        let err = task.run(&dirty, &sink).unwrap_err();
        assert!(matches!(err, SyncUpError::InvalidStateTransition { .. }));
    }

    #[test]
    fn mark_done_requires_a_run() {
        let (store, _) = store_with(&[]);
        let task = SyncUpTask::new(
            SyncUpConfig::new("accounts"),
            store,
            MockRemoteTarget::with_batch_capacity(2),
        );
        let err = task.mark_done(&RecordingSink::new()).unwrap_err();
        assert!(matches!(err, SyncUpError::InvalidStateTransition { .. }));
    }

    #[test]
    fn zero_capacity_target_is_rejected() {
        let (store, dirty) = store_with(&["a"]);
        let task = SyncUpTask::new(
            SyncUpConfig::new("accounts"),
            store,
            MockRemoteTarget::with_batch_capacity(0),
        );
        let sink = RecordingSink::new();

        let err = task.run(&dirty, &sink).unwrap_err();
        assert!(matches!(err, SyncUpError::InvalidBatchSize(0)));
        assert_eq!(task.state().status, SyncStatus::Failed);
    }

    #[test]
    fn load_failure_fails_the_run_before_uploads() {
        let store = MemoryStore::new(); // has no records
        let target = MockRemoteTarget::with_batch_capacity(2);
        let task = SyncUpTask::new(SyncUpConfig::new("accounts"), store, target);
        let sink = RecordingSink::new();

        let err = task.run(&[RecordId::from("ghost")], &sink).unwrap_err();
        assert!(matches!(err, SyncUpError::LocalRead { .. }));
        assert_eq!(task.state().status, SyncStatus::Failed);
        assert_eq!(task.stats().upload_calls, 0);
        assert!(task.stats().last_error.unwrap().contains("ghost"));
        assert_eq!(sink.last_status(), Some(SyncStatus::Failed));
    }

    #[test]
    fn lookup_failure_fails_before_uploads() {
        let (store, dirty) = store_with(&["a", "b"]);
        let target = MockRemoteTarget::with_batch_capacity(2);
        target.fail_lookup();
        let config =
            SyncUpConfig::new("accounts").with_merge_mode(MergeMode::LeaveIfChanged);
        let task = SyncUpTask::new(config, store, target);
        let sink = RecordingSink::new();

        let err = task.run(&dirty, &sink).unwrap_err();
        assert!(matches!(err, SyncUpError::RemoteLookup { .. }));
        assert_eq!(task.state().status, SyncStatus::Failed);
        assert_eq!(task.stats().upload_calls, 0);
    }
}
