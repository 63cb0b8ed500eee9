//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crategraph_core::CrategraphConfig;

pub mod status;
pub mod sync;

/// Back-fill crate and version timestamps from PostgreSQL into Neo4j
#[derive(Parser)]
#[command(name = "crategraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML config file with [postgres], [graph] and [sync] sections
    #[arg(short, long, global = true, env = "CRATEGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection overrides; each wins over the config file.
#[derive(Args, Default)]
#[command(next_help_heading = "Connection")]
pub struct ConnectionArgs {
    /// PostgreSQL host
    #[arg(long, global = true, env = "CRATEGRAPH_PG_HOST")]
    pub pg_host: Option<String>,

    /// PostgreSQL port
    #[arg(long, global = true, env = "CRATEGRAPH_PG_PORT")]
    pub pg_port: Option<u16>,

    /// PostgreSQL database name
    #[arg(long, global = true, env = "CRATEGRAPH_PG_DATABASE")]
    pub pg_database: Option<String>,

    /// PostgreSQL user
    #[arg(long, global = true, env = "CRATEGRAPH_PG_USER")]
    pub pg_user: Option<String>,

    /// PostgreSQL password
    #[arg(long, global = true, env = "CRATEGRAPH_PG_PASSWORD", hide_env_values = true)]
    pub pg_password: Option<String>,

    /// Neo4j Bolt URI
    #[arg(long, global = true, env = "CRATEGRAPH_NEO4J_URI")]
    pub neo4j_uri: Option<String>,

    /// Neo4j user
    #[arg(long, global = true, env = "CRATEGRAPH_NEO4J_USER")]
    pub neo4j_user: Option<String>,

    /// Neo4j password
    #[arg(long, global = true, env = "CRATEGRAPH_NEO4J_PASSWORD", hide_env_values = true)]
    pub neo4j_password: Option<String>,

    /// Neo4j database name
    #[arg(long, global = true, env = "CRATEGRAPH_NEO4J_DATABASE")]
    pub neo4j_database: Option<String>,
}

impl ConnectionArgs {
    /// Overlay the flags that were given onto a loaded config.
    pub fn apply(&self, config: &mut CrategraphConfig) {
        let pg = &mut config.postgres;
        if let Some(host) = &self.pg_host {
            pg.host = host.clone();
        }
        if let Some(port) = self.pg_port {
            pg.port = port;
        }
        if let Some(database) = &self.pg_database {
            pg.database = database.clone();
        }
        if let Some(user) = &self.pg_user {
            pg.user = user.clone();
        }
        if let Some(password) = &self.pg_password {
            pg.password = password.clone();
        }

        let graph = &mut config.graph;
        if let Some(uri) = &self.neo4j_uri {
            graph.uri = uri.clone();
        }
        if let Some(user) = &self.neo4j_user {
            graph.user = user.clone();
        }
        if let Some(password) = &self.neo4j_password {
            graph.password = password.clone();
        }
        if let Some(database) = &self.neo4j_database {
            graph.database = database.clone();
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy created_at from PostgreSQL onto matching graph nodes
    Sync(sync::SyncArgs),

    /// Compare source row counts with graph property coverage
    Status,
}

impl Cli {
    /// Config file (or defaults) with connection flags and env applied.
    pub fn resolve_config(&self) -> Result<CrategraphConfig> {
        let mut config = CrategraphConfig::load(self.config.as_deref())
            .context("Failed to load configuration")?;
        self.connection.apply(&mut config);
        Ok(config)
    }

    pub async fn execute(self) -> Result<()> {
        let config = self.resolve_config()?;

        match self.command {
            Commands::Sync(args) => sync::execute(args, &config).await,
            Commands::Status => status::execute(&config).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = CrategraphConfig::default();
        let args = ConnectionArgs {
            pg_host: Some("172.17.0.2".to_string()),
            pg_port: Some(6432),
            neo4j_uri: Some("bolt://graph:7687".to_string()),
            ..ConnectionArgs::default()
        };
        args.apply(&mut config);

        assert_eq!(config.postgres.host, "172.17.0.2");
        assert_eq!(config.postgres.port, 6432);
        assert_eq!(config.postgres.database, "crates");
        assert_eq!(config.graph.uri, "bolt://graph:7687");
        assert_eq!(config.graph.user, "neo4j");
    }

    #[test]
    fn test_parse_sync_command() {
        let cli = Cli::try_parse_from([
            "crategraph",
            "--pg-host",
            "db",
            "sync",
            "versions",
            "--skip-failed",
            "--max-attempts",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.connection.pg_host.as_deref(), Some("db"));
        match cli.command {
            Commands::Sync(args) => {
                assert_eq!(args.target, sync::SyncTarget::Versions);
                assert!(args.skip_failed);
                assert_eq!(args.max_attempts, Some(5));
                assert!(!args.dry_run);
            }
            Commands::Status => panic!("expected sync"),
        }
    }
}
