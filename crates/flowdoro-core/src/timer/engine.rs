//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` periodically.
//! Each tick recomputes the phase's time from absolute timestamps, so the
//! tick period only affects how quickly a change is noticed.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Focus --expires--> Focus(paused, awaiting)
//!                   ^                  |continue        |decline
//!                   |                  v                v
//!                   +--expires---- Break <--decline--- Flow
//! ```
//!
//! Every transition that changes the state ends by writing a snapshot.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::open(1500, 300, clock, persistence, notifier);
//! engine.start();
//! // In a loop:
//! engine.tick(); // Returns Some(Event) when a phase expires
//! ```

use std::sync::Arc;

use super::command::Command;
use super::state::{ContinueDecision, Phase, TimerState, TimerView};
use crate::clock::{elapsed_seconds, Clock};
use crate::error::ValidationError;
use crate::events::{timestamp, Event};
use crate::notify::{Alert, Notifier};
use crate::storage::Persistence;

/// Core timer state machine with its collaborators.
pub struct TimerEngine {
    state: TimerState,
    clock: Arc<dyn Clock>,
    persistence: Persistence,
    notifier: Box<dyn Notifier>,
}

impl TimerEngine {
    /// Create an engine in a fresh Idle state with the given durations.
    pub fn new(
        focus_duration_secs: u64,
        break_duration_secs: u64,
        clock: Arc<dyn Clock>,
        persistence: Persistence,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            state: TimerState::new(focus_duration_secs, break_duration_secs),
            clock,
            persistence,
            notifier,
        }
    }

    /// Create an engine, resuming from the stored snapshot when one is valid.
    ///
    /// A restored session keeps its own durations and clock anchors. A
    /// restored state that never started takes the configured durations.
    pub fn open(
        focus_duration_secs: u64,
        break_duration_secs: u64,
        clock: Arc<dyn Clock>,
        persistence: Persistence,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let mut engine = Self::new(
            focus_duration_secs,
            break_duration_secs,
            clock,
            persistence,
            notifier,
        );
        if let Some(mut restored) = engine.persistence.restore() {
            if !restored.started {
                restored.focus_duration_secs = focus_duration_secs;
                restored.break_duration_secs = break_duration_secs;
            }
            engine.state = restored;
        }
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Whether a session is running and the sampler should keep ticking.
    pub fn is_active(&self) -> bool {
        self.state.started
    }

    pub fn progress(&self) -> f64 {
        self.state.progress()
    }

    pub fn view(&self) -> TimerView {
        TimerView::from(&self.state)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn apply(&mut self, command: Command) -> Option<Event> {
        match command {
            Command::Start => self.start(),
            Command::ConfirmContinue => self.confirm_continue(),
            Command::DeclineContinue => self.decline_continue(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Reset => self.reset(),
        }
    }

    /// Begin the first Focus. No-op once a session has started.
    pub fn start(&mut self) -> Option<Event> {
        if self.state.started {
            return None;
        }
        let now = self.clock.now_ms();
        self.begin_phase(Phase::Focus, now);
        self.state.started = true;
        tracing::debug!(duration_secs = self.state.focus_duration_secs, "focus started");
        self.persist();
        Some(Event::FocusStarted {
            duration_secs: self.state.focus_duration_secs,
            at: timestamp(now),
        })
    }

    /// Answer "yes" to continuing an expired Focus: enter Flow.
    pub fn confirm_continue(&mut self) -> Option<Event> {
        if !self.state.awaiting_continue {
            return None;
        }
        let now = self.clock.now_ms();
        self.state.continue_decision = ContinueDecision::Continue;
        self.state.awaiting_continue = false;
        self.begin_phase(Phase::Flow, now);
        tracing::debug!("flow started");
        self.persist();
        Some(Event::FlowStarted { at: timestamp(now) })
    }

    /// Answer "no" to continuing an expired Focus, or end Flow: enter Break.
    pub fn decline_continue(&mut self) -> Option<Event> {
        if !self.state.awaiting_continue && self.state.phase != Phase::Flow {
            return None;
        }
        let now = self.clock.now_ms();
        if self.state.awaiting_continue {
            self.state.continue_decision = ContinueDecision::Stop;
            self.state.awaiting_continue = false;
        }
        self.begin_phase(Phase::Break, now);
        tracing::debug!(duration_secs = self.state.break_duration_secs, "break started");
        self.persist();
        Some(Event::BreakStarted {
            duration_secs: self.state.break_duration_secs,
            decision: self.state.continue_decision,
            at: timestamp(now),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state.phase == Phase::Idle || self.state.paused {
            return None;
        }
        let now = self.clock.now_ms();
        self.pause_at(now);
        self.persist();
        Some(Event::Paused {
            phase: self.state.phase,
            seconds: self.state.seconds,
            at: timestamp(now),
        })
    }

    /// Resume a paused phase. An expired Focus stays paused until answered.
    pub fn resume(&mut self) -> Option<Event> {
        if !self.state.paused || self.state.awaiting_continue {
            return None;
        }
        let now = self.clock.now_ms();
        let paused_ms = self
            .state
            .pause_start_ms
            .map(|start| now.saturating_sub(start).max(0))
            .unwrap_or(0);
        self.state.pause_offset_ms = self.state.pause_offset_ms.saturating_add(paused_ms);
        self.state.pause_start_ms = None;
        self.state.paused = false;
        self.persist();
        Some(Event::Resumed {
            phase: self.state.phase,
            seconds: self.state.seconds,
            pause_offset_ms: self.state.pause_offset_ms,
            at: timestamp(now),
        })
    }

    /// Abandon the session. Clears the stored snapshot.
    pub fn reset(&mut self) -> Option<Event> {
        if !self.state.started && self.state.phase == Phase::Idle {
            return None;
        }
        self.state = TimerState::new(
            self.state.focus_duration_secs,
            self.state.break_duration_secs,
        );
        self.persistence.clear();
        tracing::debug!("timer reset");
        Some(Event::Reset {
            at: timestamp(self.clock.now_ms()),
        })
    }

    /// Change phase lengths. Only allowed before a session starts.
    pub fn set_durations(
        &mut self,
        focus_duration_secs: u64,
        break_duration_secs: u64,
    ) -> Result<(), ValidationError> {
        if self.state.started {
            return Err(ValidationError::SessionActive);
        }
        for (field, value) in [
            ("focus_duration", focus_duration_secs),
            ("break_duration", break_duration_secs),
        ] {
            if value == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        self.state.focus_duration_secs = focus_duration_secs;
        self.state.break_duration_secs = break_duration_secs;
        self.persist();
        Ok(())
    }

    /// Call periodically. Recomputes the phase's seconds and handles expiry
    /// in the same step. Returns `Some(Event)` when a phase expires.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state.paused || self.state.phase == Phase::Idle {
            return None;
        }
        let before = self.state.clone();
        let now = self.clock.now_ms();
        let elapsed = elapsed_seconds(now, self.state.phase_start_ms, self.state.pause_offset_ms);
        self.state.seconds = match self.state.phase {
            Phase::Flow => elapsed,
            Phase::Focus => secs(self.state.focus_duration_secs) - elapsed,
            Phase::Break => secs(self.state.break_duration_secs) - elapsed,
            Phase::Idle => self.state.seconds,
        };

        let event = if self.state.phase.expires() && self.state.seconds <= 0 {
            self.expire(now)
        } else {
            None
        };

        if self.state != before {
            self.persist();
        }
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn expire(&mut self, now: i64) -> Option<Event> {
        match self.state.phase {
            Phase::Focus => {
                self.notifier.notify(Alert::FocusComplete);
                self.pause_at(now);
                self.state.awaiting_continue = true;
                tracing::debug!("focus expired, awaiting continue decision");
                Some(Event::FocusExpired { at: timestamp(now) })
            }
            Phase::Break => {
                self.notifier.notify(Alert::BreakComplete);
                self.begin_phase(Phase::Focus, now);
                tracing::debug!("break expired, focus started");
                Some(Event::BreakExpired {
                    focus_duration_secs: self.state.focus_duration_secs,
                    at: timestamp(now),
                })
            }
            Phase::Idle | Phase::Flow => None,
        }
    }

    /// Enter `phase` with fresh clock anchors at `now`, unpaused.
    fn begin_phase(&mut self, phase: Phase, now: i64) {
        self.state.phase = phase;
        self.state.phase_start_ms = now;
        self.state.pause_offset_ms = 0;
        self.state.pause_start_ms = None;
        self.state.paused = false;
        self.state.seconds = match phase {
            Phase::Focus => secs(self.state.focus_duration_secs),
            Phase::Break => secs(self.state.break_duration_secs),
            Phase::Idle | Phase::Flow => 0,
        };
    }

    fn pause_at(&mut self, now: i64) {
        if !self.state.paused {
            self.state.paused = true;
            self.state.pause_start_ms = Some(now);
        }
    }

    fn persist(&self) {
        if let Err(e) = self.persistence.save(&self.state) {
            tracing::error!(error = %e, "failed to save timer snapshot");
        }
    }
}

fn secs(duration: u64) -> i64 {
    i64::try_from(duration).unwrap_or(i64::MAX)
}
