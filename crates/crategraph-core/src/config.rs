//! Connection and sync configuration.
//!
//! Values come from an optional TOML file with `[postgres]`, `[graph]` and
//! `[sync]` sections. The CLI layers flags and environment variables on top.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CrategraphConfig {
    pub postgres: PostgresConfig,
    pub graph: GraphConfig,
    pub sync: SyncSettings,
}

impl CrategraphConfig {
    /// Load from a TOML file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&raw).map_err(|source| CoreError::ConfigParse {
                    path: path.to_path_buf(),
                    source,
                })
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

/// Configuration for connecting to PostgreSQL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "crates".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
        }
    }
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: String::new(),
            database: "neo4j".to_string(),
        }
    }
}

/// What to do with a row whose write still fails after all retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Stop the run and propagate the error.
    #[default]
    Abort,
    /// Record the row in the report and continue.
    Skip,
}

/// Bounded per-row retry with exponential backoff.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per row, including the first. `1` disables retry.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 200,
            max_backoff_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// No retries, no delay.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Delay before retry number `retry` (1-based), doubling up to the cap.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64.checked_shl(retry.saturating_sub(1)).unwrap_or(u64::MAX);
        let ms = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }

    /// Attempts actually made; a configured `0` still runs once.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Settings for the sync job.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncSettings {
    pub retry: RetryPolicy,
    pub failure_mode: FailureMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_no_credentials() {
        let config = CrategraphConfig::default();
        assert!(config.postgres.password.is_empty());
        assert!(config.graph.password.is_empty());
        assert_eq!(config.postgres.port, 5432);
        assert_eq!(config.graph.database, "neo4j");
        assert_eq!(config.sync.failure_mode, FailureMode::Abort);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let raw = r#"
            [postgres]
            host = "172.17.0.2"
            user = "crates"

            [graph]
            uri = "bolt://graph:7687"

            [sync]
            failure_mode = "skip"

            [sync.retry]
            max_attempts = 5
        "#;
        let config = CrategraphConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.postgres.host, "172.17.0.2");
        assert_eq!(config.postgres.user, "crates");
        assert_eq!(config.postgres.database, "crates");
        assert_eq!(config.graph.uri, "bolt://graph:7687");
        assert_eq!(config.graph.user, "neo4j");
        assert_eq!(config.sync.failure_mode, FailureMode::Skip);
        assert_eq!(config.sync.retry.max_attempts, 5);
        assert_eq!(config.sync.retry.initial_backoff_ms, 200);
    }

    #[test]
    fn test_unknown_failure_mode_rejected() {
        let raw = "[sync]\nfailure_mode = \"ignore\"\n";
        assert!(CrategraphConfig::from_toml_str(raw).is_err());
    }

    #[test]
    fn test_load_without_path_is_default() {
        let config = CrategraphConfig::load(None).unwrap();
        assert_eq!(config.postgres.host, "localhost");
    }

    #[test]
    fn test_load_missing_file() {
        let err = CrategraphConfig::load(Some(Path::new("/nonexistent/crategraph.toml"))).unwrap_err();
        assert!(matches!(err, CoreError::ConfigRead { .. }));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_backoff_ms: 200,
            max_backoff_ms: 1_000,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(400));
        assert_eq!(policy.backoff(3), Duration::from_millis(800));
        assert_eq!(policy.backoff(4), Duration::from_millis(1_000));
        assert_eq!(policy.backoff(80), Duration::from_millis(1_000));
    }

    #[test]
    fn test_zero_attempts_runs_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.attempts(), 1);
        assert_eq!(RetryPolicy::none().attempts(), 1);
    }
}
