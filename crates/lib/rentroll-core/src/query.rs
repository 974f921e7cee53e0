//! SQL construction for catalog operations.
//!
//! Every builder returns one statement plus its positional binds. Caller text is
//! always bound; only column names and fixed literals appear in the SQL itself.
//! The one exception is [`pass_through`], which runs trusted caller SQL as-is.

use std::borrow::Cow;

use rusqlite::types::Value as SqlValue;

/// A statement ready for [`SqliteRentRollStore::execute`].
///
/// [`SqliteRentRollStore::execute`]: crate::store::SqliteRentRollStore::execute
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: Cow<'static, str>,
    pub params: Vec<SqlValue>,
}

impl BuiltQuery {
    const fn fixed(sql: &'static str) -> Self {
        Self {
            sql: Cow::Borrowed(sql),
            params: Vec::new(),
        }
    }

    fn bound(sql: &'static str, params: Vec<SqlValue>) -> Self {
        Self {
            sql: Cow::Borrowed(sql),
            params,
        }
    }
}

/// How a free-text unit type request should be matched against `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMatch {
    /// Match codes starting with a bedroom/bath prefix such as `1x1`.
    ByPrefix(&'static str),
    /// Match codes containing the caller's text.
    BySubstring(String),
}

impl TypeMatch {
    fn like_pattern(&self) -> String {
        match self {
            Self::ByPrefix(prefix) => format!("{prefix}%"),
            Self::BySubstring(text) => contains_pattern(text),
        }
    }
}

const BEDROOM_PREFIXES: &[(&[&str], &str)] = &[
    (&["1-bedroom", "1 bedroom"], "1x1"),
    (&["2-bedroom", "2 bedroom"], "2x2"),
];

/// Classifies a unit type request, recognizing bedroom phrases in any casing.
#[must_use]
pub fn classify_unit_type(input: &str) -> TypeMatch {
    let lowered = input.to_lowercase();
    BEDROOM_PREFIXES
        .iter()
        .find(|(phrases, _)| phrases.iter().any(|phrase| lowered.contains(phrase)))
        .map_or_else(
            || TypeMatch::BySubstring(input.to_string()),
            |(_, prefix)| TypeMatch::ByPrefix(*prefix),
        )
}

#[must_use]
pub const fn vacant_units() -> BuiltQuery {
    BuiltQuery::fixed(
        "SELECT unit, name, type, sq_ft, status \
         FROM rent_roll \
         WHERE status IN ('VU', 'VR') \
         ORDER BY unit",
    )
}

/// Total, occupied, vacant-available, and notice counts as one row.
#[must_use]
pub const fn occupancy_counts() -> BuiltQuery {
    BuiltQuery::fixed(
        "SELECT \
           (SELECT COUNT(*) FROM rent_roll) AS total, \
           (SELECT COUNT(*) FROM rent_roll WHERE status = 'O') AS occupied, \
           (SELECT COUNT(*) FROM rent_roll WHERE status IN ('VU', 'VR')) AS vacant, \
           (SELECT COUNT(*) FROM rent_roll WHERE status = 'NU') AS notice",
    )
}

#[must_use]
pub fn units_by_type(unit_type: &str) -> BuiltQuery {
    let pattern = classify_unit_type(unit_type).like_pattern();
    BuiltQuery::bound(
        r"SELECT * FROM rent_roll WHERE type LIKE ?1 ESCAPE '\' ORDER BY unit",
        vec![SqlValue::Text(pattern)],
    )
}

#[must_use]
pub fn tenants_by_name(name: &str) -> BuiltQuery {
    BuiltQuery::bound(
        r"SELECT * FROM rent_roll WHERE name LIKE ?1 ESCAPE '\' ORDER BY unit",
        vec![SqlValue::Text(contains_pattern(name))],
    )
}

/// Occupied units whose `lease_ends` text contains the year.
#[must_use]
pub fn lease_expirations(year: &str) -> BuiltQuery {
    BuiltQuery::bound(
        r"SELECT * FROM rent_roll WHERE lease_ends LIKE ?1 ESCAPE '\' AND status = 'O' ORDER BY lease_ends",
        vec![SqlValue::Text(contains_pattern(year))],
    )
}

/// Revenue aggregates as one row; empty subsets sum to zero.
#[must_use]
pub const fn revenue_totals() -> BuiltQuery {
    BuiltQuery::fixed(
        "SELECT \
           (SELECT COALESCE(SUM(monthly_rent), 0) FROM rent_roll \
              WHERE status = 'O' AND monthly_rent > 0) AS occupied_revenue, \
           (SELECT COUNT(*) FROM rent_roll \
              WHERE status = 'O' AND monthly_rent > 0) AS revenue_units, \
           (SELECT COALESCE(SUM(monthly_rent), 0) FROM rent_roll \
              WHERE monthly_rent > 0) AS potential_revenue, \
           (SELECT COALESCE(AVG(monthly_rent), 0) FROM rent_roll \
              WHERE status = 'O' AND monthly_rent > 0) AS average_rent",
    )
}

#[must_use]
pub const fn status_breakdown() -> BuiltQuery {
    BuiltQuery::fixed(
        "SELECT status, COUNT(*) AS count FROM rent_roll GROUP BY status ORDER BY status",
    )
}

/// First rows in storage order, for the schema overview.
#[must_use]
pub fn sample_rows(limit: u32) -> BuiltQuery {
    BuiltQuery::bound(
        "SELECT * FROM rent_roll ORDER BY id LIMIT ?1",
        vec![SqlValue::Integer(i64::from(limit))],
    )
}

/// Trusted caller SQL, executed verbatim without binds.
#[must_use]
pub fn pass_through(sql: &str) -> BuiltQuery {
    BuiltQuery {
        sql: Cow::Owned(sql.to_string()),
        params: Vec::new(),
    }
}

fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound_text(query: &BuiltQuery) -> &str {
        match query.params.as_slice() {
            [SqlValue::Text(text)] => text.as_str(),
            other => panic!("expected a single text bind, got {other:?}"),
        }
    }

    #[test]
    fn bedroom_phrases_become_prefixes() {
        assert_eq!(classify_unit_type("1-bedroom"), TypeMatch::ByPrefix("1x1"));
        assert_eq!(classify_unit_type("a 1 Bedroom please"), TypeMatch::ByPrefix("1x1"));
        assert_eq!(classify_unit_type("2-BEDROOM"), TypeMatch::ByPrefix("2x2"));
        assert_eq!(classify_unit_type("2 bedroom"), TypeMatch::ByPrefix("2x2"));
    }

    #[test]
    fn other_text_falls_back_to_substring() {
        assert_eq!(
            classify_unit_type("1x1.2"),
            TypeMatch::BySubstring("1x1.2".to_string())
        );
        assert_eq!(
            classify_unit_type("3-bedroom"),
            TypeMatch::BySubstring("3-bedroom".to_string())
        );
    }

    #[test]
    fn casing_does_not_change_the_built_query() {
        assert_eq!(units_by_type("1-BEDROOM"), units_by_type("1-bedroom"));
    }

    #[test]
    fn caller_text_is_bound_not_interpolated() {
        let query = tenants_by_name("O'Brien");
        assert!(!query.sql.contains("O'Brien"));
        assert_eq!(bound_text(&query), "%O'Brien%");
    }

    #[test]
    fn like_wildcards_in_caller_text_are_escaped() {
        let query = units_by_type("50%_off");
        assert_eq!(bound_text(&query), r"%50\%\_off%");
    }

    #[test]
    fn lease_expirations_restricts_to_occupied() {
        let query = lease_expirations("2025");
        assert!(query.sql.contains("status = 'O'"));
        assert!(query.sql.contains("ORDER BY lease_ends"));
        assert_eq!(bound_text(&query), "%2025%");
    }

    #[test]
    fn pass_through_keeps_sql_verbatim() {
        let query = pass_through("SELECT unit FROM rent_roll LIMIT 1");
        assert_eq!(query.sql, "SELECT unit FROM rent_roll LIMIT 1");
        assert!(query.params.is_empty());
    }
}
