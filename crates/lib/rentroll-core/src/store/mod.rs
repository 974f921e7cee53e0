//! Store interfaces and `SQLite` implementation.
//!
//! The store layer owns the `rent_roll` table: schema bootstrap, batch upserts
//! from the loader, and parameterized reads for the query service.

pub mod sqlite;

pub use sqlite::{Row, SqliteRentRollStore, StoreError, StoreResult};
