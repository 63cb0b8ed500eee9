//! Entity kinds and their declarative sync descriptors.
//!
//! Each kind maps to a static [`EntityDescriptor`] holding everything the sync
//! job needs: the relational projection, the graph label, the natural key
//! fields and the property being back-filled.

use std::fmt;

/// Entity kinds whose timestamps are synced into the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Crate,
    Version,
}

impl EntityKind {
    /// All kinds, in the order `sync all` processes them.
    pub const ALL: [EntityKind; 2] = [EntityKind::Crate, EntityKind::Version];

    /// The static descriptor for this kind.
    pub fn descriptor(&self) -> &'static EntityDescriptor {
        match self {
            EntityKind::Crate => &CRATE,
            EntityKind::Version => &VERSION,
        }
    }

    /// The graph node label for this kind.
    pub fn label(&self) -> &'static str {
        self.descriptor().label
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Crate => "crate",
            EntityKind::Version => "version",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of one relational-to-graph property sync.
#[derive(Debug)]
pub struct EntityDescriptor {
    /// Graph node label matched by the write.
    pub label: &'static str,
    /// Projection yielding the key columns and `created_at`, unfiltered and unordered.
    pub read_sql: &'static str,
    /// Row count of the same projection.
    pub count_sql: &'static str,
    /// Natural key fields. Column aliases in `read_sql` and node properties share these names.
    pub key_fields: &'static [&'static str],
    /// Node property being set, also the timestamp column alias.
    pub property: &'static str,
}

static CRATE: EntityDescriptor = EntityDescriptor {
    label: "Crate",
    read_sql: "SELECT crates.name AS name, crates.created_at AS created_at FROM crates",
    count_sql: "SELECT count(*) FROM crates",
    key_fields: &["name"],
    property: "created_at",
};

static VERSION: EntityDescriptor = EntityDescriptor {
    label: "Version",
    read_sql: "SELECT crates.name AS name, versions.num AS version, versions.created_at AS created_at \
               FROM versions JOIN crates ON versions.crate_id = crates.id",
    count_sql: "SELECT count(*) FROM versions JOIN crates ON versions.crate_id = crates.id",
    key_fields: &["name", "version"],
    property: "created_at",
};

impl EntityDescriptor {
    /// Cypher that matches one node by natural key, sets the property and
    /// returns the match count as `matched`.
    ///
    /// Never creates nodes: a key with no node yields `matched = 0`.
    pub fn write_cypher(&self) -> String {
        let key_map = self
            .key_fields
            .iter()
            .map(|f| format!("{f}: ${f}"))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "MATCH (n:{label} {{{key_map}}}) SET n.{prop} = datetime(${prop}) RETURN count(n) AS matched",
            label = self.label,
            prop = self.property,
        )
    }

    /// Cypher counting nodes of this label and how many carry the property.
    pub fn coverage_cypher(&self) -> String {
        format!(
            "MATCH (n:{label}) RETURN count(n) AS total, count(n.{prop}) AS with_property",
            label = self.label,
            prop = self.property,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_write_matches_by_name_only() {
        let cypher = EntityKind::Crate.descriptor().write_cypher();
        assert_eq!(
            cypher,
            "MATCH (n:Crate {name: $name}) SET n.created_at = datetime($created_at) RETURN count(n) AS matched"
        );
    }

    #[test]
    fn test_version_write_matches_by_name_and_version() {
        let cypher = EntityKind::Version.descriptor().write_cypher();
        assert_eq!(
            cypher,
            "MATCH (n:Version {name: $name, version: $version}) SET n.created_at = datetime($created_at) RETURN count(n) AS matched"
        );
    }

    #[test]
    fn test_read_sql_aliases_cover_key_fields() {
        for kind in EntityKind::ALL {
            let d = kind.descriptor();
            for field in d.key_fields {
                assert!(d.read_sql.contains(&format!("AS {field}")), "{kind}: missing alias {field}");
            }
            assert!(d.read_sql.contains(&format!("AS {}", d.property)));
            assert!(!d.read_sql.contains("ORDER BY"));
            assert!(!d.read_sql.contains("WHERE"));
        }
    }

    #[test]
    fn test_version_read_joins_crates() {
        let sql = EntityKind::Version.descriptor().read_sql;
        assert!(sql.contains("JOIN crates ON versions.crate_id = crates.id"));
        assert!(sql.contains("versions.num AS version"));
    }

    #[test]
    fn test_coverage_cypher() {
        assert_eq!(
            EntityKind::Version.descriptor().coverage_cypher(),
            "MATCH (n:Version) RETURN count(n) AS total, count(n.created_at) AS with_property"
        );
    }
}
