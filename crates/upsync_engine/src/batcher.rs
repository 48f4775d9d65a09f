//! Capacity-bounded record grouping.

use upsync_model::Record;

/// Accumulates records in arrival order into fixed-capacity groups.
///
/// A pure grouping primitive: it knows nothing about totals, eligibility or
/// cancellation. The orchestrator decides when to flush, either because the
/// batcher [`is_full`](Batcher::is_full) or because input is exhausted.
#[derive(Debug)]
pub struct Batcher {
    capacity: usize,
    items: Vec<Record>,
}

impl Batcher {
    /// Creates a batcher with the given capacity.
    ///
    /// Capacity validation is the caller's job; the orchestrator rejects
    /// targets reporting a capacity below 1 before constructing one.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 1);
        Self {
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Appends a record to the current group.
    pub fn push(&mut self, record: Record) {
        self.items.push(record);
    }

    /// Returns true once the current group has reached capacity.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Number of records in the current group.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the current group is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Takes the current group, leaving the batcher empty.
    ///
    /// Returns `None` when there is nothing accumulated, so empty groups are
    /// never handed to the upload collaborator.
    pub fn take(&mut self) -> Option<Vec<Record>> {
        if self.items.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.items))
        }
    }
}
