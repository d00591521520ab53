use serde::{Deserialize, Serialize};

/// The phase of the focus/flow/break cycle. Exactly one is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    /// Fixed-length work, counts down.
    Focus,
    /// Open-ended deep work after a Focus, counts up and never expires.
    Flow,
    /// Fixed-length rest, counts down.
    Break,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Focus => "Focus",
            Self::Flow => "Flow",
            Self::Break => "Break",
        }
    }

    /// Display color, as a hex RGB string.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Focus => "#ff4d4d",
            Self::Flow => "#4d94ff",
            Self::Break => "#4dff4d",
            Self::Idle => "#666666",
        }
    }

    /// Whether the phase ends by itself when its remaining time runs out.
    pub fn expires(&self) -> bool {
        matches!(self, Self::Focus | Self::Break)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The user's last answer to "continue into flow?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContinueDecision {
    #[default]
    Unset,
    Continue,
    Stop,
}

impl ContinueDecision {
    pub fn as_option(&self) -> Option<bool> {
        match self {
            Self::Unset => None,
            Self::Continue => Some(true),
            Self::Stop => Some(false),
        }
    }

    pub fn from_option(value: Option<bool>) -> Self {
        match value {
            None => Self::Unset,
            Some(true) => Self::Continue,
            Some(false) => Self::Stop,
        }
    }
}

/// Complete state of the timer, clock anchors included.
///
/// `seconds` means elapsed time in Flow and remaining time in Focus and
/// Break. Remaining time can dip below zero when a sample arrives late; the
/// expiry check runs in the same sample, so that value is never observed
/// without the transition having happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: Phase,
    pub paused: bool,
    /// Set once the first Focus begins.
    pub started: bool,
    pub seconds: i64,
    pub focus_duration_secs: u64,
    pub break_duration_secs: u64,
    /// True between a Focus expiring and the user answering.
    pub awaiting_continue: bool,
    pub continue_decision: ContinueDecision,
    /// Epoch ms at which the current phase's timing began.
    pub phase_start_ms: i64,
    /// Epoch ms at which the current pause began.
    pub pause_start_ms: Option<i64>,
    /// Total paused ms to subtract from the phase's elapsed time.
    pub pause_offset_ms: i64,
}

impl TimerState {
    /// A fresh, never-started Idle state.
    pub fn new(focus_duration_secs: u64, break_duration_secs: u64) -> Self {
        Self {
            phase: Phase::Idle,
            paused: false,
            started: false,
            seconds: 0,
            focus_duration_secs,
            break_duration_secs,
            awaiting_continue: false,
            continue_decision: ContinueDecision::Unset,
            phase_start_ms: 0,
            pause_start_ms: None,
            pause_offset_ms: 0,
        }
    }

    /// Configured length of the current phase, if it has one.
    pub fn phase_duration_secs(&self) -> Option<u64> {
        match self.phase {
            Phase::Focus => Some(self.focus_duration_secs),
            Phase::Break => Some(self.break_duration_secs),
            Phase::Idle | Phase::Flow => None,
        }
    }

    /// Progress through the current phase in percent, clamped to `0..=100`.
    ///
    /// Flow has no length, so it is measured against a total of one second
    /// and reads 100 as soon as a second has elapsed.
    pub fn progress(&self) -> f64 {
        let (total, current) = match self.phase {
            Phase::Idle => return 0.0,
            Phase::Flow => (1.0, self.seconds as f64),
            Phase::Focus | Phase::Break => {
                let total = self.phase_duration_secs().unwrap_or(0) as f64;
                (total, total - self.seconds as f64)
            }
        };
        if total <= 0.0 {
            return 0.0;
        }
        (current / total * 100.0).clamp(0.0, 100.0)
    }
}

/// Format seconds as zero-padded `HH:MM:SS`. Negative values use their
/// magnitude.
pub fn format_time(total_seconds: i64) -> String {
    let s = total_seconds.unsigned_abs();
    let hours = s / 3600;
    let minutes = (s % 3600) / 60;
    let secs = s % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Read-only view for renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerView {
    pub phase: Phase,
    pub color: String,
    pub progress: f64,
    pub seconds: i64,
    pub clock: String,
    pub paused: bool,
    pub started: bool,
    pub awaiting_continue: bool,
    pub continue_decision: ContinueDecision,
}

impl From<&TimerState> for TimerView {
    fn from(state: &TimerState) -> Self {
        Self {
            phase: state.phase,
            color: state.phase.color().to_string(),
            progress: state.progress(),
            seconds: state.seconds,
            clock: format_time(state.seconds),
            paused: state.paused,
            started: state.started,
            awaiting_continue: state.awaiting_continue,
            continue_decision: state.continue_decision,
        }
    }
}
