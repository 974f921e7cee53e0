//! Parsers for rent roll source exports.
//!
//! Each parser turns an external export format into [`RentRollRow`] values;
//! validation against the unit record invariants happens at load time.
//!
//! [`RentRollRow`]: rentroll_store::models::RentRollRow

pub mod jsonl;

pub use jsonl::{JsonlParseError, RentRollJsonlParser};
