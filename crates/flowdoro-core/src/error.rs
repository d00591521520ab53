//! Core error types for flowdoro-core.
//!
//! The timer itself never fails: every error here is either surfaced to a
//! caller that asked for something explicit (loading config, opening the
//! store) or logged and swallowed by the persistence layer.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for flowdoro-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a [`crate::storage::Store`] backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    /// The data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[source] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Durations must be positive
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Durations can only change before a session starts
    #[error("Cannot change durations while a session is running")]
    SessionActive,
}

/// Reasons a stored snapshot is rejected on restore.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The stored text is not a valid snapshot document
    #[error("Malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// More than one phase flag was set
    #[error("Snapshot has conflicting phase flags (focus={focus}, flow={flow}, break={brk})")]
    ConflictingPhases { focus: bool, flow: bool, brk: bool },

    /// The snapshot outlived its time-to-live
    #[error("Snapshot expired at {expiry_ms} (now {now_ms})")]
    Expired { expiry_ms: i64, now_ms: i64 },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
