use crate::query;
use crate::render::{SchemaOverview, StatusCount};
use crate::store::{SqliteRentRollStore, StoreResult};

use super::dispatch::{fetch, load_occupancy};

/// Rows included in the overview sample, in storage order.
pub const SAMPLE_ROW_LIMIT: u32 = 3;

/// Gathers counts, the per-status breakdown, and sample rows.
///
/// # Errors
/// Returns the store's error when any statement is rejected.
pub fn load(store: &SqliteRentRollStore) -> StoreResult<SchemaOverview> {
    let stats = load_occupancy(store)?;
    let breakdown = fetch(store, &query::status_breakdown())?
        .iter()
        .map(StatusCount::from_row)
        .collect();
    let sample = fetch(store, &query::sample_rows(SAMPLE_ROW_LIMIT))?;
    Ok(SchemaOverview {
        stats,
        breakdown,
        sample,
    })
}
