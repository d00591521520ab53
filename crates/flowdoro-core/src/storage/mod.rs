mod config;
pub mod database;
pub mod persistence;
pub mod store;

pub use config::{Config, NotificationsConfig, PersistenceConfig, TimerConfig};
pub use database::Database;
pub use persistence::{Persistence, DEFAULT_TTL, SNAPSHOT_KEY};
pub use store::{MemoryStore, Store};

use std::path::PathBuf;

/// Returns `~/.config/flowdoro[-dev]/` based on FLOWDORO_ENV.
///
/// Set FLOWDORO_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FLOWDORO_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("flowdoro-dev")
    } else {
        base_dir.join("flowdoro")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
