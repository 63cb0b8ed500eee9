//! Property sync command.

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use colored::Colorize;

use crategraph_core::{CrategraphConfig, EntityKind, FailureMode};
use crategraph_db::PgSource;
use crategraph_graph::{GraphClient, SyncOptions};

use crate::output;

#[derive(Args)]
pub struct SyncArgs {
    /// Which entities to sync
    #[arg(value_enum)]
    pub target: SyncTarget,

    /// Read and decode all rows without writing to the graph
    #[arg(long)]
    pub dry_run: bool,

    /// Record rows that still fail after retries and keep going
    #[arg(long)]
    pub skip_failed: bool,

    /// Attempts per row write, including the first (1 disables retry)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Print the match count of every write
    #[arg(long)]
    pub echo: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SyncTarget {
    Crates,
    Versions,
    All,
}

impl SyncTarget {
    pub fn kinds(&self) -> &'static [EntityKind] {
        match self {
            SyncTarget::Crates => &[EntityKind::Crate],
            SyncTarget::Versions => &[EntityKind::Version],
            SyncTarget::All => &EntityKind::ALL,
        }
    }
}

/// Build run options: config `[sync]` section, then flags.
fn sync_options(args: &SyncArgs, config: &CrategraphConfig) -> SyncOptions {
    let mut options = SyncOptions::from(&config.sync);
    options.dry_run = args.dry_run;
    if args.skip_failed {
        options.failure_mode = FailureMode::Skip;
    }
    if let Some(max_attempts) = args.max_attempts {
        options.retry.max_attempts = max_attempts;
    }
    options
}

pub async fn execute(args: SyncArgs, config: &CrategraphConfig) -> Result<()> {
    let options = sync_options(&args, config);
    let echo = args.echo;

    let mut source = PgSource::connect(&config.postgres)
        .await
        .context("Failed to connect to PostgreSQL")?;
    let graph = GraphClient::connect(&config.graph)
        .await
        .context("Failed to connect to Neo4j")?;

    if options.dry_run {
        println!("{}", "Dry run: no graph writes will be issued.".yellow());
    }

    let mut failed = 0;
    for &kind in args.target.kinds() {
        println!("{} {}", "Syncing".bold(), kind.label().cyan());

        let report = crategraph_graph::run_sync(&mut source, &graph, kind, &options, |row, matched| {
            if echo {
                output::print_write(row, matched);
            }
        })
        .await?;

        output::print_report(&report);
        failed += report.failed.len();
    }

    source.close().await.context("Failed to close PostgreSQL connection")?;
    drop(graph);

    if failed > 0 {
        bail!("{} row(s) failed to sync", failed);
    }
    Ok(())
}
