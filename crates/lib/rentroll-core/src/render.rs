//! Rendering of query results into payloads and markdown digests.

use std::fmt::Write as _;

use rentroll_store::models::UnitStatus;
use rentroll_store::schema::COLUMN_GUIDE;
use serde::Serialize;
use serde_json::Value;

use crate::store::Row;

/// Maximum items listed in a search digest before truncation.
pub const SEARCH_DISPLAY_CAP: usize = 10;

/// Result of a successful operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// Machine-readable result.
    pub payload: Value,
    /// Human-readable markdown summary, ending with the payload as JSON.
    pub digest: String,
}

/// Unit counts by occupancy group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OccupancyStats {
    pub total: i64,
    pub occupied: i64,
    pub vacant: i64,
    pub notice: i64,
    pub occupancy_rate: f64,
    pub vacancy_rate: f64,
}

impl OccupancyStats {
    /// Builds stats from a row with `total`, `occupied`, `vacant`, `notice` columns.
    #[must_use]
    pub fn from_row(row: &Row) -> Self {
        let total = int_field(row, "total");
        let occupied = int_field(row, "occupied");
        let occupancy_rate = occupancy_rate(occupied, total);
        let vacancy_rate = if total > 0 {
            round_tenth(100.0 - occupancy_rate)
        } else {
            0.0
        };
        Self {
            total,
            occupied,
            vacant: int_field(row, "vacant"),
            notice: int_field(row, "notice"),
            occupancy_rate,
            vacancy_rate,
        }
    }
}

/// Monthly rent totals and derived figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevenueAnalysis {
    pub occupied_revenue: f64,
    pub potential_revenue: f64,
    pub vacancy_loss: f64,
    pub average_rent: f64,
    pub revenue_units: i64,
    pub annual_revenue: f64,
    pub annual_potential: f64,
}

impl RevenueAnalysis {
    /// Builds the analysis from the revenue totals row; missing sums count as zero.
    #[must_use]
    pub fn from_row(row: &Row) -> Self {
        let occupied_revenue = amount_field(row, "occupied_revenue").unwrap_or(0.0);
        let potential_revenue = amount_field(row, "potential_revenue").unwrap_or(0.0);
        Self {
            occupied_revenue,
            potential_revenue,
            vacancy_loss: potential_revenue - occupied_revenue,
            average_rent: amount_field(row, "average_rent").unwrap_or(0.0),
            revenue_units: int_field(row, "revenue_units"),
            annual_revenue: occupied_revenue * 12.0,
            annual_potential: potential_revenue * 12.0,
        }
    }
}

/// Per-status row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

impl StatusCount {
    #[must_use]
    pub fn from_row(row: &Row) -> Self {
        Self {
            status: text_field(row, "status").to_string(),
            count: int_field(row, "count"),
        }
    }
}

/// Aggregate view of the table plus a few sample rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaOverview {
    pub stats: OccupancyStats,
    pub breakdown: Vec<StatusCount>,
    pub sample: Vec<Row>,
}

/// Occupied share of all units as a percentage rounded to one decimal.
///
/// An empty table has a rate of `0.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn occupancy_rate(occupied: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round_tenth(occupied as f64 / total as f64 * 100.0)
}

#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}")
}

/// Formats an amount with thousands separators, rounded to cents, dropping
/// trailing zero decimals (`1200` -> `1,200`, `1234.5` -> `1,234.5`).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let mut out = String::new();
    if value < 0.0 && cents > 0 {
        out.push('-');
    }
    out.push_str(&group_thousands(cents / 100));
    let fraction = cents % 100;
    if fraction % 10 == 0 && fraction != 0 {
        let _ = write!(out, ".{}", fraction / 10);
    } else if fraction != 0 {
        let _ = write!(out, ".{fraction:02}");
    }
    out
}

#[must_use]
pub fn vacant_units(rows: Vec<Row>) -> ToolOutput {
    let headline = format!("**Vacant Units: {} units available**", rows.len());
    listing(&headline, rows, None, "Details", |row| {
        format!(
            "- **Unit {}** - {} ({}) - Status: {}",
            scalar_field(row, "unit"),
            text_field(row, "type"),
            sq_ft_text(row),
            status_text(row),
        )
    })
}

#[must_use]
pub fn occupancy_stats(stats: &OccupancyStats) -> ToolOutput {
    let digest = format!(
        "**Occupancy Statistics**\n\n\
         **Overall Rate:** {}% occupied\n\n\
         **Breakdown:**\n\
         - **Total Units:** {}\n\
         - **Occupied:** {} units\n\
         - **Vacant Available:** {} units\n\
         - **Notice/Pending:** {} units\n\n\
         **Vacancy Rate:** {}%",
        format_percent(stats.occupancy_rate),
        stats.total,
        stats.occupied,
        stats.vacant,
        stats.notice,
        format_percent(stats.vacancy_rate),
    );
    ToolOutput {
        payload: to_payload(stats),
        digest,
    }
}

#[must_use]
pub fn units_by_type(unit_type: &str, rows: Vec<Row>) -> ToolOutput {
    let headline = format!("**Units matching \"{unit_type}\": {} found**", rows.len());
    listing(&headline, rows, Some(SEARCH_DISPLAY_CAP), "Full Data", |row| {
        format!(
            "- **Unit {}** - {} - {} ({}) - {} - {}",
            scalar_field(row, "unit"),
            tenant_text(row),
            text_field(row, "type"),
            sq_ft_text(row),
            rent_text(row),
            status_text(row),
        )
    })
}

#[must_use]
pub fn tenants_by_name(name: &str, rows: Vec<Row>) -> ToolOutput {
    let headline = format!("**Tenants matching \"{name}\": {} found**", rows.len());
    listing(&headline, rows, Some(SEARCH_DISPLAY_CAP), "Details", |row| {
        format!(
            "- **{}** - Unit {} - {} - {}",
            tenant_text(row),
            scalar_field(row, "unit"),
            text_field(row, "type"),
            rent_text(row),
        )
    })
}

#[must_use]
pub fn lease_expirations(year: &str, rows: Vec<Row>) -> ToolOutput {
    let headline = format!("**Leases expiring in {year}: {} leases**", rows.len());
    listing(&headline, rows, None, "Details", |row| {
        format!(
            "- **{}** - Unit {} - Expires: {} - {}",
            tenant_text(row),
            scalar_field(row, "unit"),
            text_field(row, "lease_ends"),
            rent_text(row),
        )
    })
}

#[must_use]
pub fn revenue_analysis(analysis: &RevenueAnalysis) -> ToolOutput {
    let digest = format!(
        "**Revenue Analysis**\n\n\
         **Current Monthly Revenue:** ${}\n\
         **Potential Monthly Revenue:** ${}\n\
         **Revenue Loss from Vacancy:** ${}\n\n\
         **Average Rent:** ${:.2}/month\n\
         **Occupied Units Generating Revenue:** {}\n\n\
         **Annual Projections:**\n\
         - Current Annual Revenue: ${}\n\
         - Potential Annual Revenue: ${}",
        format_currency(analysis.occupied_revenue),
        format_currency(analysis.potential_revenue),
        format_currency(analysis.vacancy_loss),
        analysis.average_rent,
        analysis.revenue_units,
        format_currency(analysis.annual_revenue),
        format_currency(analysis.annual_potential),
    );
    ToolOutput {
        payload: to_payload(analysis),
        digest,
    }
}

#[must_use]
pub fn pass_through(sql: &str, rows: Vec<Row>) -> ToolOutput {
    let count = rows.len();
    let payload = rows_payload(rows);
    let digest = format!(
        "**SQL Query:** `{sql}`\n\n**Results:** {count} rows returned\n\n{}",
        json_block(&payload)
    );
    ToolOutput { payload, digest }
}

/// Markdown text for the schema overview resource.
#[must_use]
pub fn schema_overview(overview: &SchemaOverview) -> String {
    let stats = &overview.stats;
    let mut text = String::from("# Rent Roll Database Overview\n\n## Quick Stats\n");
    let _ = writeln!(text, "- **Total Units:** {}", stats.total);
    let _ = writeln!(
        text,
        "- **Occupied:** {} ({}%)",
        stats.occupied,
        format_percent(stats.occupancy_rate)
    );
    let _ = writeln!(text, "- **Vacant:** {}", stats.vacant);

    text.push_str("\n## Status Codes\n");
    for status in UnitStatus::ALL {
        let _ = writeln!(text, "- '{}' = {}", status.code(), status.label());
    }

    text.push_str("\n## Status Breakdown\n");
    for entry in &overview.breakdown {
        let _ = writeln!(text, "- {}: {} units", entry.status, entry.count);
    }

    text.push_str("\n## Available Columns\n");
    for (column, description) in COLUMN_GUIDE {
        let _ = writeln!(text, "- {column}: {description}");
    }

    let sample = rows_payload(overview.sample.clone());
    let _ = write!(text, "\n## Sample Data\n{}", pretty_json(&sample));
    text
}

fn listing(
    headline: &str,
    rows: Vec<Row>,
    cap: Option<usize>,
    details_label: &str,
    line: impl Fn(&Row) -> String,
) -> ToolOutput {
    let total = rows.len();
    let shown = cap.map_or(total, |cap| cap.min(total));
    let mut digest = format!("{headline}\n\n");
    for row in &rows[..shown] {
        digest.push_str(&line(row));
        digest.push('\n');
    }
    if shown < total {
        let _ = writeln!(digest, "\n*Showing first {shown} of {total} results*");
    }
    let payload = rows_payload(rows);
    let _ = write!(digest, "\n**{details_label}:**\n{}", json_block(&payload));
    ToolOutput { payload, digest }
}

fn rows_payload(rows: Vec<Row>) -> Value {
    Value::Array(rows.into_iter().map(Value::Object).collect())
}

fn to_payload<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn json_block(value: &Value) -> String {
    format!("```json\n{}\n```", pretty_json(value))
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn text_field<'a>(row: &'a Row, key: &str) -> &'a str {
    row.get(key).and_then(Value::as_str).unwrap_or_default()
}

#[allow(clippy::cast_possible_truncation)]
fn int_field(row: &Row, key: &str) -> i64 {
    match row.get(key) {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|value| value as i64))
            .unwrap_or(0),
        _ => 0,
    }
}

fn amount_field(row: &Row, key: &str) -> Option<f64> {
    row.get(key).and_then(Value::as_f64)
}

fn scalar_field(row: &Row, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => "?".to_string(),
        Some(other) => other.to_string(),
    }
}

fn sq_ft_text(row: &Row) -> String {
    row.get("sq_ft")
        .and_then(Value::as_i64)
        .map_or_else(|| "sq ft n/a".to_string(), |sq_ft| format!("{sq_ft} sq ft"))
}

fn rent_text(row: &Row) -> String {
    amount_field(row, "monthly_rent").map_or_else(
        || "rent n/a".to_string(),
        |rent| format!("${}/month", format_currency(rent)),
    )
}

fn status_text(row: &Row) -> String {
    let code = text_field(row, "status");
    UnitStatus::from_code(code).map_or_else(|| code.to_string(), |status| status.label().to_string())
}

fn tenant_text(row: &Row) -> &str {
    let name = text_field(row, "name");
    if name.trim().is_empty() { "(vacant)" } else { name }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn unit_rows(count: i64) -> Vec<Row> {
        (1..=count)
            .map(|unit| {
                row(json!({
                    "unit": 100 + unit,
                    "name": format!("Tenant {unit}"),
                    "type": "1x1.1",
                    "sq_ft": 650,
                    "monthly_rent": 1200.0,
                    "status": "O",
                }))
            })
            .collect()
    }

    #[test]
    fn currency_uses_separators_without_forced_decimals() {
        assert_eq!(format_currency(1200.0), "1,200");
        assert_eq!(format_currency(3600.0), "3,600");
        assert_eq!(format_currency(1_234_567.5), "1,234,567.5");
        assert_eq!(format_currency(999.99), "999.99");
        assert_eq!(format_currency(0.0), "0");
        assert_eq!(format_currency(-2400.0), "-2,400");
    }

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(format_percent(occupancy_rate(1, 3)), "33.3");
        assert_eq!(format_percent(occupancy_rate(3, 3)), "100.0");
    }

    #[test]
    fn empty_table_has_zero_rate() {
        let rate = occupancy_rate(0, 0);
        assert!(rate.is_finite());
        assert!(rate.abs() < f64::EPSILON);

        let stats = OccupancyStats::from_row(&row(json!({
            "total": 0, "occupied": 0, "vacant": 0, "notice": 0
        })));
        assert_eq!(format_percent(stats.occupancy_rate), "0.0");
        assert_eq!(format_percent(stats.vacancy_rate), "0.0");
    }

    #[test]
    fn revenue_treats_missing_sums_as_zero() {
        let analysis = RevenueAnalysis::from_row(&row(json!({
            "occupied_revenue": null,
            "potential_revenue": null,
            "average_rent": null,
            "revenue_units": 0,
        })));
        assert!(analysis.vacancy_loss.abs() < f64::EPSILON);
        assert!(revenue_analysis(&analysis).digest.contains("**Average Rent:** $0.00/month"));
    }

    #[test]
    fn search_digest_truncates_after_cap() {
        let output = units_by_type("1x1", unit_rows(12));
        assert!(output.digest.contains("12 found"));
        assert!(output.digest.contains("Unit 110"));
        assert!(!output.digest.contains("**Unit 111**"));
        assert!(output.digest.contains("*Showing first 10 of 12 results*"));
        assert_eq!(output.payload.as_array().map(Vec::len), Some(12));
    }

    #[test]
    fn vacancy_listing_is_not_truncated() {
        let output = vacant_units(unit_rows(12));
        assert!(output.digest.contains("**Unit 112**"));
        assert!(!output.digest.contains("Showing first"));
    }

    #[test]
    fn pass_through_digest_embeds_payload() {
        let output = pass_through(
            "SELECT 1 AS one",
            vec![row(json!({ "one": 1 }))],
        );
        assert!(output.digest.contains("**Results:** 1 rows returned"));
        assert!(output.digest.contains("\"one\": 1"));
        assert_eq!(output.payload, json!([{ "one": 1 }]));
    }

    #[test]
    fn overview_lists_breakdown_and_columns() {
        let overview = SchemaOverview {
            stats: OccupancyStats::from_row(&row(json!({
                "total": 2, "occupied": 1, "vacant": 1, "notice": 0
            }))),
            breakdown: vec![
                StatusCount { status: "O".to_string(), count: 1 },
                StatusCount { status: "VR".to_string(), count: 1 },
            ],
            sample: unit_rows(1),
        };
        let text = schema_overview(&overview);
        assert!(text.contains("- **Occupied:** 1 (50.0%)"));
        assert!(text.contains("- VR: 1 units"));
        assert!(text.contains("- 'NU' = Notice/Unknown"));
        assert!(text.contains("- lease_ends: Lease end date"));
        assert!(text.contains("\"unit\": 101"));
    }
}
