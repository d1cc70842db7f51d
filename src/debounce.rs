//! Read debouncing.
//!
//! A card held against the reader (or re-presented within a couple of
//! seconds) must produce exactly one backend submission, but a
//! *different* card must never be held back.  The window is therefore
//! keyed on both identity and time:
//!
//! - different uid → forward immediately, regardless of elapsed time;
//! - same uid → forward at most once per `min_interval_ms`.
//!
//! Callers check [`should_forward`](ReadDebouncer::should_forward) and,
//! only after the event has actually been submitted, confirm with
//! [`record_forwarded`](ReadDebouncer::record_forwarded).  A dropped
//! submission (backend unreachable) is deliberately *not* recorded, so
//! the next presentation of the same card retries.

use crate::app::ports::UidString;

/// Identity/time suppression window for duplicate card reads.
pub struct ReadDebouncer {
    last_forwarded_uid: UidString,
    last_forwarded_at_ms: u64,
    min_interval_ms: u32,
    has_forwarded: bool,
}

impl ReadDebouncer {
    pub fn new(min_interval_ms: u32) -> Self {
        Self {
            last_forwarded_uid: UidString::new(),
            last_forwarded_at_ms: 0,
            min_interval_ms,
            has_forwarded: false,
        }
    }

    /// Update the window length at runtime (hot config reload).
    pub fn set_min_interval(&mut self, min_interval_ms: u32) {
        self.min_interval_ms = min_interval_ms;
    }

    /// Whether a read event for `uid` observed at `now_ms` should be
    /// forwarded downstream.
    pub fn should_forward(&self, uid: &str, now_ms: u64) -> bool {
        if !self.has_forwarded {
            return true;
        }
        uid != self.last_forwarded_uid.as_str()
            || now_ms.saturating_sub(self.last_forwarded_at_ms) >= self.min_interval_ms as u64
    }

    /// Confirm that the event for `uid` was forwarded at `now_ms`.
    pub fn record_forwarded(&mut self, uid: &str, now_ms: u64) {
        self.last_forwarded_uid.clear();
        let _ = self.last_forwarded_uid.push_str(uid);
        self.last_forwarded_at_ms = now_ms;
        self.has_forwarded = true;
    }
}
