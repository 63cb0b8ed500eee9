//! Source rows read from the relational store.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Natural key locating a graph node: ordered `(field, value)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalKey {
    fields: Vec<(&'static str, String)>,
}

impl NaturalKey {
    pub fn new(fields: Vec<(&'static str, String)>) -> Self {
        Self { fields }
    }

    /// Key for a crate node.
    pub fn crate_name(name: impl Into<String>) -> Self {
        Self::new(vec![("name", name.into())])
    }

    /// Key for a version node.
    pub fn version(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(vec![("name", name.into()), ("version", version.into())])
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    /// Value of a single key field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}={value}")?;
        }
        Ok(())
    }
}

/// One row of a relational projection: natural key plus creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub key: NaturalKey,
    pub created_at: DateTime<Utc>,
}

impl SourceRow {
    pub fn new(key: NaturalKey, created_at: DateTime<Utc>) -> Self {
        Self { key, created_at }
    }

    /// Build a row from a `timestamp without time zone`, read as UTC.
    pub fn from_naive(key: NaturalKey, created_at: NaiveDateTime) -> Self {
        Self::new(key, created_at.and_utc())
    }

    /// Timestamp as sent to the graph: RFC 3339, microseconds, `Z` suffix.
    ///
    /// Microseconds match PostgreSQL precision, so the graph `datetime()`
    /// parsed from this string is the same instant as the source.
    pub fn created_at_param(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}
