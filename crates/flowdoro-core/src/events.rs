use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{ContinueDecision, Phase};

/// Every state change in the timer produces an Event.
/// Front ends render them; the sampler forwards them on a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    FocusStarted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Focus ran out; the timer is paused awaiting a continue decision.
    FocusExpired {
        at: DateTime<Utc>,
    },
    FlowStarted {
        at: DateTime<Utc>,
    },
    BreakStarted {
        duration_secs: u64,
        decision: ContinueDecision,
        at: DateTime<Utc>,
    },
    /// Break ran out; a new Focus has begun.
    BreakExpired {
        focus_duration_secs: u64,
        at: DateTime<Utc>,
    },
    Paused {
        phase: Phase,
        seconds: i64,
        at: DateTime<Utc>,
    },
    Resumed {
        phase: Phase,
        seconds: i64,
        /// Total paused time in this phase so far.
        pause_offset_ms: i64,
        at: DateTime<Utc>,
    },
    Reset {
        at: DateTime<Utc>,
    },
}

/// Convert an epoch-ms reading from a [`crate::clock::Clock`] into a timestamp.
pub(crate) fn timestamp(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_in_snake_case() {
        let event = Event::BreakStarted {
            duration_secs: 300,
            decision: ContinueDecision::Stop,
            at: timestamp(0),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "break_started");
        assert_eq!(json["decision"], "stop");
        assert_eq!(json["at"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn timestamp_keeps_milliseconds() {
        assert_eq!(timestamp(1_500).timestamp_millis(), 1_500);
    }
}
