//! Read-only graph queries.

pub mod status;
