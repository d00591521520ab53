//! Notification port.
//!
//! Fired at each phase-expiry edge. Implementations are fire-and-forget:
//! `notify` returns nothing and must not block, so a missing audio device or
//! notification daemon can never stall or fail a transition.

use serde::{Deserialize, Serialize};

/// Which expiry produced the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    /// Focus ran out; the user is asked whether to continue into Flow.
    FocusComplete,
    /// Break ran out; the next Focus has already begun.
    BreakComplete,
}

impl Alert {
    pub fn title(&self) -> &'static str {
        match self {
            Self::FocusComplete => "Focus complete",
            Self::BreakComplete => "Break over",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            Self::FocusComplete => "Keep going in flow (enter) or take a break (n)?",
            Self::BreakComplete => "Back to focus.",
        }
    }
}

pub trait Notifier: Send {
    fn notify(&self, alert: Alert);
}

/// Drops every alert.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _alert: Alert) {}
}

impl<F> Notifier for F
where
    F: Fn(Alert) + Send,
{
    fn notify(&self, alert: Alert) {
        self(alert)
    }
}
