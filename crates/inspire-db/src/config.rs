//! # Database Configuration
//!
//! Pool settings, built in code or read from the environment.
//!
//! ## Environment Variables
//! ```text
//! ┌──────────────────────────────────┬──────────────────────┬──────────────┐
//! │ Variable                         │ Meaning              │ Default      │
//! ├──────────────────────────────────┼──────────────────────┼──────────────┤
//! │ INSPIRE_DB_PATH                  │ SQLite file          │ ./inspire.db │
//! │ INSPIRE_DB_MAX_CONNECTIONS       │ pool size            │ 5            │
//! │ INSPIRE_DB_BUSY_TIMEOUT_SECS     │ wait for write lock  │ 5            │
//! └──────────────────────────────────┴──────────────────────┴──────────────┘
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_DB_PATH: &str = "INSPIRE_DB_PATH";
pub const ENV_MAX_CONNECTIONS: &str = "INSPIRE_DB_MAX_CONNECTIONS";
pub const ENV_BUSY_TIMEOUT_SECS: &str = "INSPIRE_DB_BUSY_TIMEOUT_SECS";

const DEFAULT_DB_PATH: &str = "./inspire.db";
const IN_MEMORY_PATH: &str = ":memory:";

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },

    #[error("{0} must be greater than zero")]
    MustBePositive(String),
}

// =============================================================================
// DbConfig
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust
/// use inspire_db::DbConfig;
/// use std::time::Duration;
///
/// let config = DbConfig::new("./data/inspire.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(10));
/// assert_eq!(config.max_connections, 8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a free pool connection.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps idle
    /// connections open.
    /// Default: 10 minutes
    pub idle_timeout: Option<Duration>,

    /// Age at which a connection is closed and replaced. `None` never
    /// replaces it.
    /// Default: 30 minutes
    pub max_lifetime: Option<Duration>,

    /// How long a writer waits for another writer's lock before failing.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for the file at `path`, created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the SQLite busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// The database lives as long as its single connection, so the pool is
    /// pinned to exactly one that is never closed for idleness or age.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            max_lifetime: None,
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// True when this configuration points at a private in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    /// Reads the configuration from `INSPIRE_DB_*` environment variables.
    ///
    /// Unset variables fall back to defaults; set but unparsable ones fail.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`DbConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(ENV_DB_PATH)
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let mut config = DbConfig::new(path);

        if let Some(max) = parse_var::<u32, _>(&lookup, ENV_MAX_CONNECTIONS)? {
            if max == 0 {
                return Err(ConfigError::MustBePositive(ENV_MAX_CONNECTIONS.to_string()));
            }
            config.max_connections = max;
            config.min_connections = config.min_connections.min(max);
        }

        if let Some(secs) = parse_var::<u64, _>(&lookup, ENV_BUSY_TIMEOUT_SECS)? {
            config.busy_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig::new(DEFAULT_DB_PATH)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw,
            }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .busy_timeout(Duration::from_secs(1));

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
        assert!(!config.is_in_memory());
        assert!(config.max_lifetime.is_some());
    }

    #[test]
    fn test_in_memory_connection_is_never_recycled() {
        let config = DbConfig::in_memory();
        assert!(config.is_in_memory());
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.idle_timeout, None);
        assert_eq!(config.max_lifetime, None);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = DbConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = DbConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/var/lib/inspire/shop.db"),
            (ENV_MAX_CONNECTIONS, " 12 "),
            (ENV_BUSY_TIMEOUT_SECS, "30"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/inspire/shop.db"));
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.busy_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        assert!(matches!(
            DbConfig::from_lookup(lookup(&[(ENV_MAX_CONNECTIONS, "many")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            DbConfig::from_lookup(lookup(&[(ENV_MAX_CONNECTIONS, "0")])),
            Err(ConfigError::MustBePositive(_))
        ));
        assert!(DbConfig::from_lookup(lookup(&[(ENV_BUSY_TIMEOUT_SECS, "-1")])).is_err());
    }
}
