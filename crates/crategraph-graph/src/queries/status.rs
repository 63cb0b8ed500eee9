//! Property coverage per node label.

use anyhow::{Context, Result};
use neo4rs::Query;

use crategraph_core::EntityKind;

use crate::GraphClient;

/// How many nodes of a label exist and how many carry the synced property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    pub kind: EntityKind,
    pub total: i64,
    pub with_property: i64,
}

impl Coverage {
    pub fn missing(&self) -> i64 {
        self.total - self.with_property
    }
}

/// Count nodes for a kind's label and those that already have `created_at`.
pub async fn coverage(client: &GraphClient, kind: EntityKind) -> Result<Coverage> {
    let query = Query::new(kind.descriptor().coverage_cypher());
    let rows = client
        .query(query)
        .await
        .with_context(|| format!("Failed to read coverage for {}", kind.label()))?;

    let (total, with_property) = match rows.into_iter().next() {
        Some(row) => {
            let total: i64 = row
                .get("total")
                .map_err(|e| anyhow::anyhow!("Failed to get field 'total': {:?}", e))?;
            let with_property: i64 = row
                .get("with_property")
                .map_err(|e| anyhow::anyhow!("Failed to get field 'with_property': {:?}", e))?;
            (total, with_property)
        }
        None => (0, 0),
    };

    Ok(Coverage { kind, total, with_property })
}
