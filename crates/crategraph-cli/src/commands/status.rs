//! Sync coverage status command.

use anyhow::{Context, Result};

use crategraph_core::{CrategraphConfig, EntityKind};
use crategraph_db::PgSource;
use crategraph_graph::GraphClient;

use crate::output::{self, StatusLine};

/// Show source row counts next to graph node coverage for each kind.
pub async fn execute(config: &CrategraphConfig) -> Result<()> {
    let mut source = PgSource::connect(&config.postgres)
        .await
        .context("Failed to connect to PostgreSQL")?;
    let graph = GraphClient::connect(&config.graph)
        .await
        .context("Failed to connect to Neo4j")?;

    let mut lines = Vec::new();
    for kind in EntityKind::ALL {
        let source_rows = source
            .count_rows(kind)
            .await
            .with_context(|| format!("Failed to count {kind} rows"))?;
        let coverage = crategraph_graph::coverage(&graph, kind).await?;
        lines.push(StatusLine { source_rows, coverage });
    }

    source.close().await.context("Failed to close PostgreSQL connection")?;

    output::print_status(&lines);
    Ok(())
}
