//! Core services
//!
//! The query engine and the export encoder. Both are pure functions over the
//! in-memory event collection; handlers in `crate::api` wire them to HTTP.

pub mod export;
pub mod query;
