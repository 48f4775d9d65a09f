//! Records and modification metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Last-modified timestamp, in milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// Stable identifier of a locally stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a record id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What happened to a record locally since it was last synchronized.
///
/// Drives the per-record push path: created records are posted, updated
/// records are patched, deleted records are removed on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocalChange {
    /// Record was created locally and does not exist remotely yet.
    Created,
    /// Record exists remotely and was modified locally.
    Updated,
    /// Record was deleted locally.
    Deleted,
}

/// A locally stored record.
///
/// Owned by the local store; the engine only reads it. `fields` holds the
/// record body as a JSON document, matching what the remote target accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable identifier.
    pub id: RecordId,
    /// Local change since the last sync.
    pub change: LocalChange,
    /// Record body.
    pub fields: Map<String, Value>,
    /// Local last-modified timestamp, if known.
    pub modified_at: Option<Timestamp>,
}

impl Record {
    /// Creates a record with the given change marker and modification time.
    pub fn new(
        id: impl Into<RecordId>,
        change: LocalChange,
        fields: Map<String, Value>,
        modified_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id: id.into(),
            change,
            fields,
            modified_at,
        }
    }

    /// Creates a locally created record.
    pub fn created(id: impl Into<RecordId>, fields: Map<String, Value>, modified_at: Timestamp) -> Self {
        Self::new(id, LocalChange::Created, fields, Some(modified_at))
    }

    /// Creates a locally updated record.
    pub fn updated(id: impl Into<RecordId>, fields: Map<String, Value>, modified_at: Timestamp) -> Self {
        Self::new(id, LocalChange::Updated, fields, Some(modified_at))
    }

    /// Creates a locally deleted record.
    pub fn deleted(id: impl Into<RecordId>, modified_at: Timestamp) -> Self {
        Self::new(id, LocalChange::Deleted, Map::new(), Some(modified_at))
    }

    /// Returns true if the record was deleted locally.
    pub fn is_locally_deleted(&self) -> bool {
        self.change == LocalChange::Deleted
    }
}

/// Modification info for the remote counterpart of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteModInfo {
    /// Remote last-modified timestamp, if known.
    pub modified_at: Option<Timestamp>,
    /// True if the remote record was deleted.
    pub deleted: bool,
}

impl RemoteModInfo {
    /// Info for a live remote record modified at the given time.
    pub fn modified(timestamp: Timestamp) -> Self {
        Self {
            modified_at: Some(timestamp),
            deleted: false,
        }
    }

    /// Info for a deleted remote record.
    pub fn deleted(timestamp: Option<Timestamp>) -> Self {
        Self {
            modified_at: timestamp,
            deleted: true,
        }
    }
}
