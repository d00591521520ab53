//! Write-through snapshot persistence with a time-to-live.
//!
//! At most one snapshot exists; each save overwrites the previous one and
//! stamps a fresh expiry. A snapshot that cannot be parsed, carries
//! conflicting phase flags, or has outlived its expiry is removed on restore
//! and the caller starts from a fresh Idle state.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::store::Store;
use crate::clock::Clock;
use crate::error::{SnapshotError, StoreError};
use crate::timer::{ContinueDecision, Phase, TimerState};

pub const SNAPSHOT_KEY: &str = "timer_state";
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Stored document. One flag per phase; at most one may be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Snapshot {
    seconds: i64,
    is_focus: bool,
    is_flow: bool,
    is_break: bool,
    is_paused: bool,
    timer_started: bool,
    /// Epoch ms.
    start_time: i64,
    /// Epoch ms, present while paused.
    #[serde(default)]
    pause_start: Option<i64>,
    /// Milliseconds.
    pause_offset: i64,
    focus_time: u64,
    break_time: u64,
    allow_answer: bool,
    continue_focus: Option<bool>,
    /// Epoch ms after which the snapshot is discarded.
    expiry: i64,
}

impl Snapshot {
    fn capture(state: &TimerState, expiry: i64) -> Self {
        Self {
            seconds: state.seconds,
            is_focus: state.phase == Phase::Focus,
            is_flow: state.phase == Phase::Flow,
            is_break: state.phase == Phase::Break,
            is_paused: state.paused,
            timer_started: state.started,
            start_time: state.phase_start_ms,
            pause_start: state.pause_start_ms,
            pause_offset: state.pause_offset_ms,
            focus_time: state.focus_duration_secs,
            break_time: state.break_duration_secs,
            allow_answer: state.awaiting_continue,
            continue_focus: state.continue_decision.as_option(),
            expiry,
        }
    }

    fn phase(&self) -> Result<Phase, SnapshotError> {
        match (self.is_focus, self.is_flow, self.is_break) {
            (false, false, false) => Ok(Phase::Idle),
            (true, false, false) => Ok(Phase::Focus),
            (false, true, false) => Ok(Phase::Flow),
            (false, false, true) => Ok(Phase::Break),
            (focus, flow, brk) => Err(SnapshotError::ConflictingPhases { focus, flow, brk }),
        }
    }

    fn into_state(self) -> Result<TimerState, SnapshotError> {
        Ok(TimerState {
            phase: self.phase()?,
            paused: self.is_paused,
            started: self.timer_started,
            seconds: self.seconds,
            focus_duration_secs: self.focus_time,
            break_duration_secs: self.break_time,
            awaiting_continue: self.allow_answer,
            continue_decision: ContinueDecision::from_option(self.continue_focus),
            phase_start_ms: self.start_time,
            pause_start_ms: self.pause_start,
            pause_offset_ms: self.pause_offset,
        })
    }
}

/// Persistence adapter between the timer and a [`Store`].
pub struct Persistence {
    store: Box<dyn Store>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl Persistence {
    pub fn new(store: Box<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Overwrite the stored snapshot with `state`, expiring `ttl` from now.
    pub fn save(&self, state: &TimerState) -> Result<(), StoreError> {
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        let expiry = self.clock.now_ms().saturating_add(ttl_ms);
        let snapshot = Snapshot::capture(state, expiry);
        // Snapshot holds only plain integers and bools.
        let json = serde_json::to_string(&snapshot).unwrap_or_default();
        self.store.set(SNAPSHOT_KEY, &json)
    }

    /// Load the stored snapshot, discarding it if it is unusable.
    ///
    /// Never fails: store errors and rejected snapshots are logged and
    /// reported as `None`.
    pub fn restore(&self) -> Option<TimerState> {
        let raw = match self.store.get(SNAPSHOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read timer snapshot");
                return None;
            }
        };

        match self.decode(&raw) {
            Ok(state) => {
                tracing::debug!(phase = %state.phase, paused = state.paused, "restored timer snapshot");
                Some(state)
            }
            Err(e) => {
                match &e {
                    SnapshotError::Expired { .. } => {
                        tracing::info!(reason = %e, "discarding expired timer snapshot")
                    }
                    _ => tracing::warn!(reason = %e, "discarding unreadable timer snapshot"),
                }
                self.clear();
                None
            }
        }
    }

    /// Remove the stored snapshot. Failures are logged.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(SNAPSHOT_KEY) {
            tracing::warn!(error = %e, "could not remove timer snapshot");
        }
    }

    fn decode(&self, raw: &str) -> Result<TimerState, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(raw)?;
        let now_ms = self.clock.now_ms();
        if now_ms > snapshot.expiry {
            return Err(SnapshotError::Expired {
                expiry_ms: snapshot.expiry,
                now_ms,
            });
        }
        snapshot.into_state()
    }
}
