//! PostgreSQL to Neo4j property sync.
//!
//! One job serves every [`EntityKind`]: rows stream from a [`RowSource`] and
//! each row becomes one match-only write through a [`NodeWriter`]. Rows are
//! processed strictly in order, one awaited write at a time, with no batching
//! and no cross-row transaction. Re-running converges to the same state.

mod report;

pub use report::{FailedRow, SyncReport};

use anyhow::{Context, Result};
use futures::StreamExt;
use tracing::{debug, info, warn};

use crategraph_core::{EntityDescriptor, EntityKind, FailureMode, RetryPolicy, SourceRow, SyncSettings};
use crategraph_db::RowSource;

use crate::NodeWriter;

/// Options for one sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub retry: RetryPolicy,
    pub failure_mode: FailureMode,
    /// Read and decode every row without writing to the graph.
    pub dry_run: bool,
}

impl From<&SyncSettings> for SyncOptions {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            retry: settings.retry.clone(),
            failure_mode: settings.failure_mode,
            dry_run: false,
        }
    }
}

/// Sync `created_at` for every row of `kind` onto its matching graph node.
///
/// `on_write` sees each row with its match count, in write order.
pub async fn run_sync<S, W, F>(
    source: &mut S,
    writer: &W,
    kind: EntityKind,
    options: &SyncOptions,
    mut on_write: F,
) -> Result<SyncReport>
where
    S: RowSource + ?Sized,
    W: NodeWriter + ?Sized,
    F: FnMut(&SourceRow, i64),
{
    let descriptor = kind.descriptor();
    info!(%kind, label = descriptor.label, dry_run = options.dry_run, "Starting property sync");

    let mut report = SyncReport::new(kind);
    let mut rows = source.rows(kind);

    while let Some(row) = rows.next().await {
        let row = row.with_context(|| {
            format!("Failed to read {} row {} from PostgreSQL", kind, report.rows_read + 1)
        })?;
        report.rows_read += 1;

        if options.dry_run {
            debug!(key = %row.key, created_at = %row.created_at, "Dry run, skipping write");
            continue;
        }

        match write_with_retry(writer, descriptor, &row, &options.retry).await {
            Ok(matched) => {
                match matched {
                    0 => warn!(label = descriptor.label, key = %row.key, "No node matched"),
                    1 => debug!(label = descriptor.label, key = %row.key, "Synced created_at"),
                    n => warn!(label = descriptor.label, key = %row.key, matched = n, "Duplicate natural key in graph"),
                }
                report.record_write(matched);
                on_write(&row, matched);
            }
            Err(err) => {
                let err = err.context(format!(
                    "Failed to set {} on {} {{{}}}",
                    descriptor.property, descriptor.label, row.key
                ));
                match options.failure_mode {
                    FailureMode::Abort => return Err(err),
                    FailureMode::Skip => {
                        warn!(key = %row.key, error = %format!("{err:#}"), "Skipping row");
                        report.failed.push(FailedRow {
                            key: row.key,
                            error: format!("{err:#}"),
                        });
                    }
                }
            }
        }
    }

    info!(
        %kind,
        rows = report.rows_read,
        nodes_updated = report.nodes_updated,
        missing = report.missing,
        duplicates = report.duplicates,
        failed = report.failed.len(),
        "Property sync complete"
    );

    Ok(report)
}

/// One write, retried with backoff up to the policy's attempt limit.
async fn write_with_retry<W>(
    writer: &W,
    descriptor: &EntityDescriptor,
    row: &SourceRow,
    policy: &RetryPolicy,
) -> Result<i64>
where
    W: NodeWriter + ?Sized,
{
    let attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        match writer.set_property(descriptor, row).await {
            Ok(matched) => return Ok(matched),
            Err(err) if attempt < attempts => {
                let delay = policy.backoff(attempt);
                warn!(
                    key = %row.key,
                    attempt,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Graph write failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err.context(format!("gave up after {attempts} attempt(s)"))),
        }
    }
}
