//! Node property writes.

use anyhow::Result;
use async_trait::async_trait;
use neo4rs::Query;

use crategraph_core::{EntityDescriptor, SourceRow};

use crate::GraphClient;

/// Sets one property on the nodes matching a row's natural key.
#[async_trait]
pub trait NodeWriter: Send + Sync {
    /// Returns how many nodes matched. Never creates nodes.
    async fn set_property(&self, descriptor: &EntityDescriptor, row: &SourceRow) -> Result<i64>;
}

/// Bind the natural key fields and the timestamp onto the descriptor's write.
pub fn write_query(descriptor: &EntityDescriptor, row: &SourceRow) -> Query {
    let mut query = Query::new(descriptor.write_cypher());
    for (field, value) in row.key.fields() {
        query = query.param(field, value.as_str());
    }
    query.param(descriptor.property, row.created_at_param())
}

#[async_trait]
impl NodeWriter for GraphClient {
    async fn set_property(&self, descriptor: &EntityDescriptor, row: &SourceRow) -> Result<i64> {
        // count() always yields one row; an empty result means nothing matched
        let matched = self
            .query_count(write_query(descriptor, row), "matched")
            .await?
            .unwrap_or(0);
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crategraph_core::{EntityKind, NaturalKey};

    #[test]
    fn test_write_query_binds_key_and_timestamp() {
        let row = SourceRow::new(
            NaturalKey::version("serde", "1.0.0"),
            Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap(),
        );
        let query = write_query(EntityKind::Version.descriptor(), &row);
        assert!(query.has_param_key("name"));
        assert!(query.has_param_key("version"));
        assert!(query.has_param_key("created_at"));
    }

    #[test]
    fn test_crate_write_query_binds_no_version() {
        let row = SourceRow::new(
            NaturalKey::crate_name("serde"),
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        );
        let query = write_query(EntityKind::Crate.descriptor(), &row);
        assert!(query.has_param_key("name"));
        assert!(!query.has_param_key("version"));
    }
}
