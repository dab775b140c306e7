//! Service configuration.
//!
//! Settings come from environment variables with documented defaults; the
//! CLI layers its flags on top. Unparsable values fall back to the default
//! with a warning rather than aborting startup.

use std::env;
use std::time::Duration;
use tracing::warn;

/// Default SQLite database URL (file created on first start).
pub const DEFAULT_DATABASE_URL: &str = "sqlite://railyard.db?mode=rwc";

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Default arrival queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default seconds between state reports.
pub const DEFAULT_STATE_INTERVAL_SECS: u64 = 10;

/// Complete service configuration.
#[derive(Clone, Debug)]
pub struct Settings {
    /// SQLite database URL (`DATABASE_URL`).
    pub database_url: String,
    /// HTTP bind address (`BIND_ADDR`).
    pub bind_addr: String,
    /// Arrival queue capacity (`ARRIVAL_QUEUE_CAPACITY`).
    pub queue_capacity: usize,
    /// Where to report BUSY/STANDBY state (`STATE_URL`); reporting is
    /// disabled when unset.
    pub state_url: Option<String>,
    /// Interval between state reports (`STATE_INTERVAL`, seconds).
    pub state_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            state_url: None,
            state_interval: Duration::from_secs(DEFAULT_STATE_INTERVAL_SECS),
        }
    }
}

impl Settings {
    /// Loads settings from the environment, defaulting anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            queue_capacity: parse_env("ARRIVAL_QUEUE_CAPACITY", defaults.queue_capacity),
            state_url: env::var("STATE_URL").ok().filter(|url| !url.is_empty()),
            state_interval: Duration::from_secs(parse_env(
                "STATE_INTERVAL",
                DEFAULT_STATE_INTERVAL_SECS,
            )),
        }
    }
}

/// Parses an env var, warning and defaulting on bad input.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(var = name, value = %raw, "Unparsable setting, using default");
                default
            }
        },
        Err(_) => default,
    }
}
