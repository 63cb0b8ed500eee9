//! crategraph core library
//!
//! Entity kinds, source rows and configuration shared by the relational
//! reader, the graph writer and the CLI.

pub mod config;
pub mod entity;
pub mod error;
pub mod row;

pub use config::{CrategraphConfig, FailureMode, GraphConfig, PostgresConfig, RetryPolicy, SyncSettings};
pub use entity::{EntityDescriptor, EntityKind};
pub use error::{CoreError, CoreResult};
pub use row::{NaturalKey, SourceRow};
