//! Export Trigger - Interval gate measured in simulated time

use std::sync::{Mutex, PoisonError};

const SECOND_TO_MS_FACTOR: i64 = 1000;

/// Decide whether a new cycle is due
///
/// With no previous export the trigger always fires. A clock that moved
/// backwards behind the last export never fires until it catches up.
pub fn should_fire(last_export_ms: Option<i64>, now_ms: i64, interval_ms: i64) -> bool {
    match last_export_ms {
        None => true,
        Some(last) => now_ms.saturating_sub(last) >= interval_ms,
    }
}

/// Gates exports to at most one per configured interval
///
/// Owns the last export timestamp. The check-and-update happens under a
/// single lock so concurrent callers can never both start the same cycle.
#[derive(Debug)]
pub struct ExportTrigger {
    interval_ms: i64,
    last_export_ms: Mutex<Option<i64>>,
}

impl ExportTrigger {
    /// Create a trigger for an interval given in whole seconds
    pub fn new(interval_secs: u64) -> Self {
        let interval_ms = i64::try_from(interval_secs)
            .unwrap_or(i64::MAX / SECOND_TO_MS_FACTOR)
            .saturating_mul(SECOND_TO_MS_FACTOR);
        Self {
            interval_ms,
            last_export_ms: Mutex::new(None),
        }
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    /// Simulated time of the most recent cycle start, if any
    pub fn last_export(&self) -> Option<i64> {
        *self
            .last_export_ms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Check the gate at `now_ms`, recording `now_ms` as the last export when it fires
    pub fn check(&self, now_ms: i64) -> bool {
        let mut last = self
            .last_export_ms
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if should_fire(*last, now_ms, self.interval_ms) {
            *last = Some(now_ms);
            true
        } else {
            false
        }
    }
}
