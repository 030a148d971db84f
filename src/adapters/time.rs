//! Host clock adapter.
//!
//! Provides the monotonic millisecond clock the control loop feeds into
//! [`QuickPanel::advance`](crate::app::service::QuickPanel::advance).
//! Wraps `std::time::Instant`, so it never goes backwards.

use std::time::Instant;

/// Monotonic clock starting at zero when created.
pub struct HostClock {
    start: Instant,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since the clock was created.
    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
