//! # crategraph graph
//!
//! Neo4j side of crategraph: the Bolt client, the node property writer and
//! the property-sync job that back-fills `created_at` from PostgreSQL rows.

pub mod client;
pub mod queries;
pub mod sync;
pub mod writer;

pub use client::GraphClient;
pub use queries::status::{Coverage, coverage};
pub use sync::{FailedRow, SyncOptions, SyncReport, run_sync};
pub use writer::NodeWriter;
