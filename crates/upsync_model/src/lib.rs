//! # Upsync Model
//!
//! Record, merge-policy and run-state types for the Upsync engine.
//!
//! This crate provides:
//! - `Record` and `RecordId` for locally stored, possibly dirty records
//! - `MergeMode` and `SyncOptions` for the conflict-resolution policy
//! - `EligibilityMap` for per-run "must sync" decisions
//! - `SyncStatus` and `SyncRunState` for the run state machine
//!
//! This is a pure data crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod eligibility;
mod options;
mod record;
mod state;

pub use eligibility::EligibilityMap;
pub use options::{MergeMode, SyncOptions};
pub use record::{LocalChange, Record, RecordId, RemoteModInfo, Timestamp};
pub use state::{SyncRunState, SyncStatus};
