//! # Flowdoro Core Library
//!
//! This library provides the core logic for Flowdoro, a focus/flow/break
//! interval timer. The CLI binary is a thin front end over the same core.
//!
//! ## Architecture
//!
//! - **Clock**: wall-clock source and elapsed-time arithmetic; time is
//!   always derived from timestamps, never from counting ticks
//! - **Timer Engine**: a state machine (Idle, Focus, Flow, Break) that the
//!   caller ticks periodically, with a tokio sampler in [`TimerService`]
//! - **Storage**: write-through snapshot persistence with a time-to-live,
//!   SQLite key-value store, and TOML configuration
//! - **Notifier**: fire-and-forget alerts at phase expiry
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`Persistence`]: Snapshot save/restore
//! - [`Database`]: SQLite-backed [`Store`]
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, SnapshotError, StoreError, ValidationError};
pub use events::Event;
pub use notify::{Alert, Notifier, NullNotifier};
pub use storage::{Config, Database, MemoryStore, Persistence, Store};
pub use timer::{
    format_time, Command, ContinueDecision, Phase, TimerEngine, TimerService, TimerState,
    TimerView,
};
