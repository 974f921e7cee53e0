//! Storage models and schema helpers for rentroll-mcp.
//!
//! This crate defines the unit record model shared by the loader, the query
//! service, and the `SQLite` schema.

pub mod models;
pub mod schema;

pub use models::*;
