//! One handler per catalog operation: build, execute, render.

use crate::query::{self, BuiltQuery};
use crate::render::{self, OccupancyStats, RevenueAnalysis, ToolOutput};
use crate::store::{Row, SqliteRentRollStore, StoreResult};

use super::Operation;

/// Routes a validated operation to its handler.
///
/// # Errors
/// Returns the store's error when the statement is rejected.
pub fn run(store: &SqliteRentRollStore, operation: &Operation) -> StoreResult<ToolOutput> {
    match operation {
        Operation::VacantUnits => vacant_units(store),
        Operation::OccupancyStats => occupancy_stats(store),
        Operation::UnitsByType { unit_type } => units_by_type(store, unit_type),
        Operation::TenantsByName { name } => tenants_by_name(store, name),
        Operation::LeaseExpirations { year } => lease_expirations(store, year),
        Operation::RevenueAnalysis => revenue_analysis(store),
        Operation::CustomSql { sql } => custom_sql(store, sql),
    }
}

fn vacant_units(store: &SqliteRentRollStore) -> StoreResult<ToolOutput> {
    let rows = fetch(store, &query::vacant_units())?;
    Ok(render::vacant_units(rows))
}

fn occupancy_stats(store: &SqliteRentRollStore) -> StoreResult<ToolOutput> {
    Ok(render::occupancy_stats(&load_occupancy(store)?))
}

fn units_by_type(store: &SqliteRentRollStore, unit_type: &str) -> StoreResult<ToolOutput> {
    let rows = fetch(store, &query::units_by_type(unit_type))?;
    Ok(render::units_by_type(unit_type, rows))
}

fn tenants_by_name(store: &SqliteRentRollStore, name: &str) -> StoreResult<ToolOutput> {
    let rows = fetch(store, &query::tenants_by_name(name))?;
    Ok(render::tenants_by_name(name, rows))
}

fn lease_expirations(store: &SqliteRentRollStore, year: &str) -> StoreResult<ToolOutput> {
    let rows = fetch(store, &query::lease_expirations(year))?;
    Ok(render::lease_expirations(year, rows))
}

fn revenue_analysis(store: &SqliteRentRollStore) -> StoreResult<ToolOutput> {
    let row = fetch_one(store, &query::revenue_totals())?;
    Ok(render::revenue_analysis(&RevenueAnalysis::from_row(&row)))
}

fn custom_sql(store: &SqliteRentRollStore, sql: &str) -> StoreResult<ToolOutput> {
    let rows = fetch(store, &query::pass_through(sql))?;
    Ok(render::pass_through(sql, rows))
}

/// Current occupancy counts and rates.
///
/// # Errors
/// Returns the store's error when the statement is rejected.
pub fn load_occupancy(store: &SqliteRentRollStore) -> StoreResult<OccupancyStats> {
    let row = fetch_one(store, &query::occupancy_counts())?;
    Ok(OccupancyStats::from_row(&row))
}

pub(crate) fn fetch(store: &SqliteRentRollStore, built: &BuiltQuery) -> StoreResult<Vec<Row>> {
    store.execute(&built.sql, &built.params)
}

fn fetch_one(store: &SqliteRentRollStore, built: &BuiltQuery) -> StoreResult<Row> {
    Ok(fetch(store, built)?.into_iter().next().unwrap_or_default())
}
