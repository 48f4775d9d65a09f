//! # Upsync Engine
//!
//! Offline-first sync-up engine.
//!
//! This crate provides:
//! - Conflict resolution (overwrite vs. leave-if-changed eligibility)
//! - Capacity-bounded batching of eligible records
//! - Monotonic progress reporting and cooperative cancellation
//! - The `SyncUpTask` orchestrator driving one run end to end
//!
//! ## Architecture
//!
//! A run flows **load → classify → group → upload**:
//! 1. Load all dirty records from the local store, in id order
//! 2. Classify each record as eligible or not, per the merge mode
//! 3. Group eligible records into batches bounded by the target's capacity
//! 4. Upload each batch, updating progress after every record
//!
//! The engine owns no storage and no transport; those are the `LocalStore`
//! and `RemoteTarget` collaborator traits. Targets that implement the
//! `BatchUpload` capability get the batched path; others get one push per
//! record.
//!
//! ## Key invariants
//!
//! - Progress is non-decreasing and never reaches 100 inside the loop
//! - Uploaded batches are never empty and never exceed the target capacity
//! - A stop request is observed at iteration boundaries only; no record at or
//!   after the check point is ever uploaded
//! - Batches committed before a failure stay committed (no rollback)

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod batcher;
mod config;
mod error;
mod progress;
mod resolver;
mod store;
mod target;
mod task;

pub use batcher::Batcher;
pub use config::SyncUpConfig;
pub use error::{Stage, SyncUpError, SyncUpResult};
pub use progress::{percent, ProgressSink, ProgressTracker, RecordingSink, StopSignal};
pub use resolver::{classify, newer_than_remote};
pub use store::{LocalStore, MemoryStore};
pub use target::{BatchUpload, MockRemoteTarget, RemoteTarget, UploadCall};
pub use task::{RunOutcome, RunReport, SyncUpStats, SyncUpTask};
