use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named inputs to the timer. The source (keyboard, button, API) does not
/// matter to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    Start,
    ConfirmContinue,
    DeclineContinue,
    Pause,
    Resume,
    /// Abandon the session and return to a fresh Idle state.
    Reset,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Start,
        Command::ConfirmContinue,
        Command::DeclineContinue,
        Command::Pause,
        Command::Resume,
        Command::Reset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ConfirmContinue => "confirm-continue",
            Self::DeclineContinue => "decline-continue",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown timer command: '{0}'")]
pub struct ParseCommandError(String);

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "confirm-continue" | "continue" => Ok(Self::ConfirmContinue),
            "decline-continue" | "break" => Ok(Self::DeclineContinue),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "reset" => Ok(Self::Reset),
            other => Err(ParseCommandError(other.to_string())),
        }
    }
}
