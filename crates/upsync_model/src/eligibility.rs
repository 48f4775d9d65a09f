//! Per-run eligibility decisions.

use crate::record::RecordId;
use std::collections::HashMap;

/// Mapping from record id to "must sync" for one run.
///
/// Produced once per run by the conflict resolver and consumed immediately by
/// the orchestrator; it is never persisted and never mutated after
/// classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EligibilityMap {
    entries: HashMap<RecordId, bool>,
}

impl EligibilityMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the decision for one record id.
    pub fn insert(&mut self, id: RecordId, eligible: bool) {
        self.entries.insert(id, eligible);
    }

    /// Returns true if the record must be pushed this run.
    ///
    /// Unknown ids are not eligible.
    pub fn is_eligible(&self, id: &RecordId) -> bool {
        self.entries.get(id).copied().unwrap_or(false)
    }

    /// Number of classified records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no record has been classified.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records classified as eligible.
    pub fn eligible_count(&self) -> usize {
        self.entries.values().filter(|v| **v).count()
    }
}

impl FromIterator<(RecordId, bool)> for EligibilityMap {
    fn from_iter<I: IntoIterator<Item = (RecordId, bool)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
