//! Remote target abstraction.

use crate::error::{SyncUpError, SyncUpResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use upsync_model::{LocalChange, MergeMode, Record, RecordId, RemoteModInfo};

/// A remote system records are pushed to.
///
/// This trait abstracts the transport, allowing for different implementations
/// (REST, gRPC, mock for testing, etc.). The base capability pushes one
/// record at a time; targets that can accept whole batches additionally
/// implement [`BatchUpload`] and advertise it via [`batch_capability`].
///
/// [`batch_capability`]: RemoteTarget::batch_capability
pub trait RemoteTarget: Send + Sync {
    /// Returns remote modification info for the given records.
    ///
    /// Ids absent from the result have no remote counterpart. Only called in
    /// leave-if-changed mode.
    fn lookup_modification_info(
        &self,
        records: &[Record],
    ) -> SyncUpResult<HashMap<RecordId, RemoteModInfo>>;

    /// Creates a locally created record on the remote system.
    fn create_record(
        &self,
        record: &Record,
        fieldlist: Option<&[String]>,
        collection: &str,
    ) -> SyncUpResult<()>;

    /// Updates a locally updated record on the remote system.
    fn update_record(
        &self,
        record: &Record,
        fieldlist: Option<&[String]>,
        collection: &str,
    ) -> SyncUpResult<()>;

    /// Deletes a locally deleted record from the remote system.
    fn delete_record(&self, record: &Record, collection: &str) -> SyncUpResult<()>;

    /// Returns the batch-upload capability, if this target has one.
    ///
    /// The orchestrator selects the batched path by capability presence.
    fn batch_capability(&self) -> Option<&dyn BatchUpload> {
        None
    }
}

impl<T: RemoteTarget + ?Sized> RemoteTarget for std::sync::Arc<T> {
    fn lookup_modification_info(
        &self,
        records: &[Record],
    ) -> SyncUpResult<HashMap<RecordId, RemoteModInfo>> {
        (**self).lookup_modification_info(records)
    }

    fn create_record(
        &self,
        record: &Record,
        fieldlist: Option<&[String]>,
        collection: &str,
    ) -> SyncUpResult<()> {
        (**self).create_record(record, fieldlist, collection)
    }

    fn update_record(
        &self,
        record: &Record,
        fieldlist: Option<&[String]>,
        collection: &str,
    ) -> SyncUpResult<()> {
        (**self).update_record(record, fieldlist, collection)
    }

    fn delete_record(&self, record: &Record, collection: &str) -> SyncUpResult<()> {
        (**self).delete_record(record, collection)
    }

    fn batch_capability(&self) -> Option<&dyn BatchUpload> {
        (**self).batch_capability()
    }
}

/// Optional capability of a target that accepts whole batches.
pub trait BatchUpload: Send + Sync {
    /// Maximum number of records per uploaded batch. Must be at least 1.
    fn max_batch_size(&self) -> usize;

    /// Uploads one batch of records.
    ///
    /// All-or-nothing from the engine's viewpoint: a partial per-record
    /// failure inside the batch must surface as a batch-level error.
    fn upload_batch(
        &self,
        records: &[Record],
        fieldlist: Option<&[String]>,
        merge_mode: MergeMode,
        collection: &str,
    ) -> SyncUpResult<()>;
}

/// One recorded batch upload, as seen by [`MockRemoteTarget`].
#[derive(Debug, Clone, PartialEq)]
pub struct UploadCall {
    /// Ids of the records in the batch, in upload order.
    pub ids: Vec<RecordId>,
    /// Field allowlist passed with the batch.
    pub fieldlist: Option<Vec<String>>,
    /// Merge mode passed with the batch.
    pub merge_mode: MergeMode,
    /// Target collection name.
    pub collection: String,
}

#[derive(Debug, Default)]
struct MockState {
    remote_infos: HashMap<RecordId, RemoteModInfo>,
    batch_calls: Vec<UploadCall>,
    record_calls: Vec<(RecordId, LocalChange)>,
    lookup_calls: usize,
    upload_attempts: usize,
    fail_lookup: bool,
    fail_upload_at: Option<usize>,
}

/// A mock remote target for testing.
///
/// Batch capability is off by default; enable it with
/// [`with_batch_capacity`](MockRemoteTarget::with_batch_capacity).
#[derive(Debug, Default)]
pub struct MockRemoteTarget {
    state: RwLock<MockState>,
    batch_capacity: Option<usize>,
}

impl MockRemoteTarget {
    /// Creates a mock without batch capability.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock advertising the batch-upload capability.
    pub fn with_batch_capacity(capacity: usize) -> Self {
        Self {
            state: RwLock::new(MockState::default()),
            batch_capacity: Some(capacity),
        }
    }

    /// Sets the remote modification info for a record id.
    pub fn set_remote_info(&self, id: impl Into<RecordId>, info: RemoteModInfo) {
        self.state.write().remote_infos.insert(id.into(), info);
    }

    /// Makes the next modification-info lookup fail.
    pub fn fail_lookup(&self) {
        self.state.write().fail_lookup = true;
    }

    /// Makes the upload attempt with the given zero-based index fail.
    ///
    /// Applies to batch uploads and per-record pushes alike.
    pub fn fail_upload_at(&self, index: usize) {
        self.state.write().fail_upload_at = Some(index);
    }

    /// Recorded batch uploads, in call order. Failed attempts are not listed.
    pub fn batch_calls(&self) -> Vec<UploadCall> {
        self.state.read().batch_calls.clone()
    }

    /// Recorded per-record pushes, in call order. Failed attempts are not listed.
    pub fn record_calls(&self) -> Vec<(RecordId, LocalChange)> {
        self.state.read().record_calls.clone()
    }

    /// Number of modification-info lookups performed.
    pub fn lookup_calls(&self) -> usize {
        self.state.read().lookup_calls
    }

    fn check_upload(&self) -> SyncUpResult<()> {
        let mut state = self.state.write();
        let attempt = state.upload_attempts;
        state.upload_attempts += 1;
        if state.fail_upload_at == Some(attempt) {
            return Err(SyncUpError::upload("mock upload failure"));
        }
        Ok(())
    }

    fn push(&self, record: &Record) -> SyncUpResult<()> {
        self.check_upload()?;
        self.state
            .write()
            .record_calls
            .push((record.id.clone(), record.change));
        Ok(())
    }
}

impl RemoteTarget for MockRemoteTarget {
    fn lookup_modification_info(
        &self,
        records: &[Record],
    ) -> SyncUpResult<HashMap<RecordId, RemoteModInfo>> {
        let mut state = self.state.write();
        state.lookup_calls += 1;
        if state.fail_lookup {
            return Err(SyncUpError::remote_lookup("mock lookup failure"));
        }
        Ok(records
            .iter()
            .filter_map(|r| state.remote_infos.get(&r.id).map(|info| (r.id.clone(), *info)))
            .collect())
    }

    fn create_record(
        &self,
        record: &Record,
        _fieldlist: Option<&[String]>,
        _collection: &str,
    ) -> SyncUpResult<()> {
        self.push(record)
    }

    fn update_record(
        &self,
        record: &Record,
        _fieldlist: Option<&[String]>,
        _collection: &str,
    ) -> SyncUpResult<()> {
        self.push(record)
    }

    fn delete_record(&self, record: &Record, _collection: &str) -> SyncUpResult<()> {
        self.push(record)
    }

    fn batch_capability(&self) -> Option<&dyn BatchUpload> {
        self.batch_capacity.map(|_| self as &dyn BatchUpload)
    }
}

impl BatchUpload for MockRemoteTarget {
    fn max_batch_size(&self) -> usize {
        self.batch_capacity.unwrap_or(0)
    }

    fn upload_batch(
        &self,
        records: &[Record],
        fieldlist: Option<&[String]>,
        merge_mode: MergeMode,
        collection: &str,
    ) -> SyncUpResult<()> {
        self.check_upload()?;
        self.state.write().batch_calls.push(UploadCall {
            ids: records.iter().map(|r| r.id.clone()).collect(),
            fieldlist: fieldlist.map(|f| f.to_vec()),
            merge_mode,
            collection: collection.to_owned(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use upsync_model::Record;

    fn record(id: &str) -> Record {
        Record::updated(id, serde_json::Map::new(), 10)
    }

    #[test]
    fn capability_presence() {
        let plain = MockRemoteTarget::new();
        assert!(plain.batch_capability().is_none());

        let batched = MockRemoteTarget::with_batch_capacity(25);
        let capability = batched.batch_capability().unwrap();
        assert_eq!(capability.max_batch_size(), 25);
    }

    #[test]
    fn lookup_returns_only_known_ids() {
        let target = MockRemoteTarget::new();
        target.set_remote_info("a", RemoteModInfo::modified(7));

        let records = [record("a"), record("b")];
        let infos = target.lookup_modification_info(&records).unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[&RecordId::from("a")].modified_at, Some(7));
        assert_eq!(target.lookup_calls(), 1);
    }

    #[test]
    fn scripted_upload_failure() {
        let target = MockRemoteTarget::with_batch_capacity(10);
        target.fail_upload_at(1);

        let batch = [record("a")];
        assert!(target
            .upload_batch(&batch, None, MergeMode::Overwrite, "accounts")
            .is_ok());
        assert!(target
            .upload_batch(&batch, None, MergeMode::Overwrite, "accounts")
            .is_err());
        // Only the committed call is recorded.
        assert_eq!(target.batch_calls().len(), 1);
    }
}
