//! Connection configuration.

use std::time::Duration;

use serde::Deserialize;

/// Environment variable overriding [`SqliteConfig::url`].
pub const DATABASE_URL_ENV: &str = "ROWCRAFT_DATABASE_URL";

/// Settings used by [`SqliteConnection::open`](crate::SqliteConnection::open).
///
/// Every field has a default, so a partial document deserializes:
///
/// ```rust
/// use rowcraft_sqlite::SqliteConfig;
///
/// let config: SqliteConfig = serde_json::from_str(r#"{ "url": "sqlite://app.db" }"#).unwrap();
/// assert_eq!(config.url, "sqlite://app.db");
/// assert!(config.create_if_missing);
/// assert_eq!(config.busy_timeout_ms, 5000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Database URL, e.g. `sqlite://app.db` or `sqlite::memory:`.
    pub url: String,
    /// Create the database file when it does not exist.
    pub create_if_missing: bool,
    /// Enforce foreign key constraints.
    pub foreign_keys: bool,
    /// How long a locked database is retried, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            url: String::from("sqlite::memory:"),
            create_if_missing: true,
            foreign_keys: true,
            busy_timeout_ms: 5000,
        }
    }
}

impl SqliteConfig {
    /// Default configuration on `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Default configuration, with the URL taken from
    /// `ROWCRAFT_DATABASE_URL` when set.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(DATABASE_URL_ENV).map_or_else(|_| Self::default(), Self::new)
    }

    /// Busy timeout as a [`Duration`].
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
