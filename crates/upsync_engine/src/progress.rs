//! Progress reporting and cooperative cancellation.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use upsync_model::SyncStatus;

/// Percent complete after `processed` of `total` records, floor division.
pub fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed * 100) / total) as u8
}

/// Receives status and progress notifications for one run.
///
/// Invoked synchronously on the run's own thread; implementations must not
/// block materially or they stall the run.
pub trait ProgressSink: Send + Sync {
    /// Called on every status transition and progress change.
    fn on_update(&self, status: SyncStatus, percent: u8);
}

/// Computes and relays monotonic percent-complete values.
///
/// The tracker never emits 100 itself; final completion is reported by the
/// caller after the run loop returns.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    reported: u8,
}

impl ProgressTracker {
    /// Creates a tracker at zero percent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value handed to the sink.
    pub fn reported(&self) -> u8 {
        self.reported
    }

    /// Advances to `processed` of `total` records, notifying `sink`.
    ///
    /// Returns the percent relayed, or `None` when the value reached 100 and
    /// was withheld.
    pub fn advance(&mut self, processed: usize, total: usize, sink: &dyn ProgressSink) -> Option<u8> {
        let value = percent(processed, total).max(self.reported);
        if value >= 100 {
            return None;
        }
        self.reported = value;
        sink.on_update(SyncStatus::Running, value);
        Some(value)
    }
}

/// Cooperative stop flag shared between a run and its controller.
///
/// Cloning yields another handle to the same flag. The run polls the flag at
/// iteration boundaries only; an upload already dispatched runs to completion.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    /// Creates a signal with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the run stop at the next iteration boundary.
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Non-blocking poll of the stop flag.
    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A sink that records every update, for testing.
#[derive(Debug, Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<(SyncStatus, u8)>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All updates received, in order.
    pub fn updates(&self) -> Vec<(SyncStatus, u8)> {
        self.updates.lock().clone()
    }

    /// Percent values received while running, in order.
    pub fn running_percents(&self) -> Vec<u8> {
        self.updates
            .lock()
            .iter()
            .filter(|(status, _)| status.is_running())
            .map(|(_, percent)| *percent)
            .collect()
    }

    /// Last status received, if any.
    pub fn last_status(&self) -> Option<SyncStatus> {
        self.updates.lock().last().map(|(status, _)| *status)
    }
}

impl ProgressSink for RecordingSink {
    fn on_update(&self, status: SyncStatus, percent: u8) {
        self.updates.lock().push((status, percent));
    }
}
