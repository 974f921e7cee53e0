//! Core types and services for rentroll-mcp.
//!
//! This crate owns the `SQLite` record store, the JSONL loader, the query
//! builder and result renderer, and the control plane that validates and
//! dispatches catalog operations.

pub mod control;
pub mod parsers;
pub mod query;
pub mod render;
pub mod store;
