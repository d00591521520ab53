use std::sync::Arc;

use clap::Subcommand;
use flowdoro_core::{
    Command, Config, Database, Event, Persistence, SystemClock, TimerEngine, TimerView,
};

use crate::notifier::TerminalNotifier;
use crate::watch;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a session with a focus phase
    Start,
    /// Continue into flow after a focus phase ends
    Continue,
    /// Take a break (after a focus phase ends, or to end flow)
    Break,
    /// Pause the current phase
    Pause,
    /// Resume the current phase
    Resume,
    /// Abandon the session and return to idle
    Reset,
    /// Print current timer state
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the timer interactively with hotkeys
    Watch,
    /// Set focus and break lengths (seconds) for the next session
    Durations {
        /// Focus length in seconds
        #[arg(long)]
        focus: u64,
        /// Break length in seconds
        #[arg(long = "break")]
        break_secs: u64,
    },
}

impl TimerAction {
    fn command(&self) -> Option<Command> {
        match self {
            Self::Start => Some(Command::Start),
            Self::Continue => Some(Command::ConfirmContinue),
            Self::Break => Some(Command::DeclineContinue),
            Self::Pause => Some(Command::Pause),
            Self::Resume => Some(Command::Resume),
            Self::Reset => Some(Command::Reset),
            Self::Status { .. } | Self::Watch | Self::Durations { .. } => None,
        }
    }
}

/// Build an engine over the on-disk store, restoring any live session.
pub fn open_engine(config: &Config) -> Result<TimerEngine, Box<dyn std::error::Error>> {
    let clock = Arc::new(SystemClock);
    let persistence =
        Persistence::new(Box::new(Database::open()?), clock.clone()).with_ttl(config.snapshot_ttl());
    Ok(TimerEngine::open(
        config.timer.focus_duration,
        config.timer.break_duration,
        clock,
        persistence,
        Box::new(TerminalNotifier::new(&config.notifications)),
    ))
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    if let TimerAction::Watch = action {
        return watch::run(&config);
    }

    let mut engine = open_engine(&config)?;
    // Catch up on time that passed since the last run.
    if let Some(event) = engine.tick() {
        print_event(&event)?;
    }

    match action {
        TimerAction::Status { json } => {
            let view = engine.view();
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("{}", status_line(&view));
            }
        }
        TimerAction::Durations { focus, break_secs } => {
            engine.set_durations(focus, break_secs)?;
            let mut config = config;
            config.timer.focus_duration = focus;
            config.timer.break_duration = break_secs;
            config.save()?;
            println!("focus {focus}s, break {break_secs}s");
        }
        ref other => {
            let command = other.command().ok_or("not a timer command")?;
            match engine.apply(command) {
                Some(event) => print_event(&event)?,
                None => eprintln!("ignored: {command} has no effect right now"),
            }
            println!("{}", status_line(&engine.view()));
        }
    }
    Ok(())
}

fn print_event(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

/// One-line human summary, e.g. `Focus 00:12:30 50% paused`.
pub fn status_line(view: &TimerView) -> String {
    let mut line = format!("{} {} {:.0}%", view.phase, view.clock, view.progress);
    if view.paused {
        line.push_str(" paused");
    }
    if view.awaiting_continue {
        line.push_str(" | continue into flow or take a break?");
    }
    line
}
