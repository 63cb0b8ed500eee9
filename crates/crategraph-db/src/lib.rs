//! crategraph relational source
//!
//! Reads crate and version projections from a crates.io PostgreSQL database
//! as a lazy stream of [`SourceRow`](crategraph_core::SourceRow)s.

pub mod client;
pub mod source;

pub use client::{DbError, DbResult, PgSource};
pub use source::RowSource;
