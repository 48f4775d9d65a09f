//! Local record store abstraction.

use crate::error::{SyncUpError, SyncUpResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use upsync_model::{Record, RecordId};

/// Read access to the local record store.
///
/// The engine only reads records; persisting them (and clearing their dirty
/// markers after a successful run) stays with the store's owner.
pub trait LocalStore: Send + Sync {
    /// Loads the records for `ids` from `collection`.
    ///
    /// The result order must match `ids`; progress accounting depends on it.
    fn load_by_ids(&self, collection: &str, ids: &[RecordId]) -> SyncUpResult<Vec<Record>>;
}

impl<T: LocalStore + ?Sized> LocalStore for std::sync::Arc<T> {
    fn load_by_ids(&self, collection: &str, ids: &[RecordId]) -> SyncUpResult<Vec<Record>> {
        (**self).load_by_ids(collection, ids)
    }
}

/// An in-memory local store for testing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<RecordId, Record>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record.
    pub fn put(&self, record: Record) {
        self.records.write().insert(record.id.clone(), record);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl LocalStore for MemoryStore {
    fn load_by_ids(&self, _collection: &str, ids: &[RecordId]) -> SyncUpResult<Vec<Record>> {
        let records = self.records.read();
        ids.iter()
            .map(|id| {
                records
                    .get(id)
                    .cloned()
                    .ok_or_else(|| SyncUpError::local_read(format!("no record with id {id}")))
            })
            .collect()
    }
}
