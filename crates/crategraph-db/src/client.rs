//! PostgreSQL connection management.

use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use thiserror::Error;
use tracing::{debug, info};

use crategraph_core::{EntityKind, PostgresConfig};

/// Relational source error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    #[error("Failed to decode column '{column}': {source}")]
    Decode {
        column: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to decode column '{column}' as timestamptz ({aware}) or timestamp ({naive})")]
    Timestamp {
        column: String,
        aware: sqlx::Error,
        naive: sqlx::Error,
    },
}

/// Result type for relational source operations.
pub type DbResult<T> = Result<T, DbError>;

/// A single PostgreSQL connection owned by one sync run.
///
/// Dropping the source closes the socket; [`PgSource::close`] performs the
/// graceful protocol shutdown on the success path.
pub struct PgSource {
    pub(crate) conn: PgConnection,
}

impl PgSource {
    /// Open a connection from config.
    pub async fn connect(config: &PostgresConfig) -> DbResult<Self> {
        let options = connect_options(config);
        let conn = PgConnection::connect_with(&options).await?;
        info!(host = %config.host, port = config.port, database = %config.database, "Connected to PostgreSQL");
        Ok(Self { conn })
    }

    /// Row count of a kind's projection.
    pub async fn count_rows(&mut self, kind: EntityKind) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(kind.descriptor().count_sql)
            .fetch_one(&mut self.conn)
            .await?;
        debug!(%kind, count, "Counted source rows");
        Ok(count)
    }

    /// Close the connection gracefully.
    pub async fn close(self) -> DbResult<()> {
        self.conn.close().await?;
        debug!("PostgreSQL connection closed");
        Ok(())
    }
}

fn connect_options(config: &PostgresConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .password(&config.password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options_from_config() {
        let config = PostgresConfig {
            host: "172.17.0.2".to_string(),
            port: 5433,
            database: "crates".to_string(),
            user: "reader".to_string(),
            password: "secret".to_string(),
        };
        let options = connect_options(&config);
        assert_eq!(options.get_host(), "172.17.0.2");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_database(), Some("crates"));
        assert_eq!(options.get_username(), "reader");
    }
}
