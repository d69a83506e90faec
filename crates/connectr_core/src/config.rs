//! Runtime configuration for embedding callers.
//!
//! # Responsibility
//! - Collect store location, store-call timeout and logging settings.
//! - Read overrides from `CONNECTR_*` environment variables.
//!
//! # Invariants
//! - `store_timeout` is never zero.
//! - Malformed environment values are reported, never silently defaulted.

use crate::error::{CoreError, CoreResult};
use crate::logging::default_log_level;
use crate::store::{SqliteCollectionStore, TimeoutStore};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "CONNECTR_DB_PATH";
pub const ENV_STORE_TIMEOUT_MS: &str = "CONNECTR_STORE_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "CONNECTR_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CONNECTR_LOG_DIR";

const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file; `None` opens a private in-memory database.
    pub database_path: Option<PathBuf>,
    /// Upper bound for one store call.
    pub store_timeout: Duration,
    pub log_level: String,
    /// Rolling log directory; `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Builds a config from process environment variables.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    ///
    /// # Errors
    /// - `Validation` when the timeout is not a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = non_blank(lookup(ENV_DB_PATH)) {
            config.database_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = non_blank(lookup(ENV_STORE_TIMEOUT_MS)) {
            let millis = raw.parse::<u64>().ok().filter(|value| *value > 0).ok_or_else(|| {
                CoreError::validation(
                    ENV_STORE_TIMEOUT_MS,
                    format!("expected a positive integer of milliseconds, got `{raw}`"),
                )
            })?;
            config.store_timeout = Duration::from_millis(millis);
        }
        if let Some(level) = non_blank(lookup(ENV_LOG_LEVEL)) {
            config.log_level = level;
        }
        if let Some(dir) = non_blank(lookup(ENV_LOG_DIR)) {
            config.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Opens the configured SQLite store behind the per-call timeout.
    ///
    /// Reads are cut off by `TimeoutStore`; writes are bounded by the same
    /// value as a connection-lock deadline.
    pub fn open_store(&self) -> CoreResult<TimeoutStore<SqliteCollectionStore>> {
        let store = match &self.database_path {
            Some(path) => SqliteCollectionStore::open(path)?,
            None => SqliteCollectionStore::open_in_memory()?,
        }
        .with_lock_timeout(self.store_timeout);
        Ok(TimeoutStore::new(store, self.store_timeout))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}
