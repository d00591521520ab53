//! Wall-clock source and elapsed-time arithmetic.
//!
//! The timer never counts ticks. Every sample recomputes elapsed time from
//! absolute timestamps, so a host that stalls (suspended laptop, blocked
//! thread) catches up on the very next sample instead of replaying ticks.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source of "now" in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn set_ms(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let delta = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Whole seconds elapsed since `phase_start_ms`, excluding paused time.
///
/// `floor((now - start - pause_offset) / 1000)`. A clock that moved
/// backwards yields 0 rather than a negative count.
pub fn elapsed_seconds(now_ms: i64, phase_start_ms: i64, pause_offset_ms: i64) -> i64 {
    let running_ms = now_ms
        .saturating_sub(phase_start_ms)
        .saturating_sub(pause_offset_ms);
    running_ms.max(0).div_euclid(1000)
}
