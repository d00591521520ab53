mod command;
mod engine;
mod service;
mod state;

pub use command::{Command, ParseCommandError};
pub use engine::TimerEngine;
pub use service::{TimerService, DEFAULT_SAMPLE_INTERVAL};
pub use state::{format_time, ContinueDecision, Phase, TimerState, TimerView};
