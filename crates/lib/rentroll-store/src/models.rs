use std::{error::Error, fmt};

use serde::{Deserialize, Serialize};

use crate::schema::{
    STATUS_NOTICE_UNKNOWN,
    STATUS_OCCUPIED,
    STATUS_VACANT_READY,
    STATUS_VACANT_UNIT,
};

/// Occupancy state of a unit, stored as a short code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitStatus {
    #[serde(rename = "O")]
    Occupied,
    #[serde(rename = "VU")]
    VacantUnit,
    #[serde(rename = "NU")]
    NoticeUnknown,
    #[serde(rename = "VR")]
    VacantReady,
}

impl UnitStatus {
    pub const ALL: [Self; 4] = [
        Self::Occupied,
        Self::VacantUnit,
        Self::NoticeUnknown,
        Self::VacantReady,
    ];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Occupied => STATUS_OCCUPIED,
            Self::VacantUnit => STATUS_VACANT_UNIT,
            Self::NoticeUnknown => STATUS_NOTICE_UNKNOWN,
            Self::VacantReady => STATUS_VACANT_READY,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Occupied => "Occupied",
            Self::VacantUnit => "Vacant Unit",
            Self::NoticeUnknown => "Notice/Unknown",
            Self::VacantReady => "Vacant Ready",
        }
    }

    /// Vacant and available to lease (`VU` or `VR`).
    #[must_use]
    pub const fn is_vacant(self) -> bool {
        matches!(self, Self::VacantUnit | Self::VacantReady)
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of the rent roll export, using the export's field names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RentRollRow {
    #[serde(rename = "Unit")]
    pub unit: i64,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "TYPE")]
    pub unit_type: String,
    #[serde(rename = "SQ FT", default)]
    pub sq_ft: Option<i64>,
    #[serde(rename = "AUTOBILL", default)]
    pub autobill: Option<f64>,
    #[serde(rename = "DEPOSIT", default)]
    pub deposit: Option<f64>,
    #[serde(rename = "MOVED IN", default)]
    pub moved_in: Option<String>,
    #[serde(rename = "LEASE ENDS", default)]
    pub lease_ends: Option<String>,
    #[serde(rename = "STATUS")]
    pub status: String,
}

/// Canonical unit record as written to the `rent_roll` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitRecord {
    pub unit: i64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub unit_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sq_ft: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_rent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_ends: Option<String>,
    pub status: UnitStatus,
}

/// A source row that violates the unit record invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRecord {
    pub unit: i64,
    pub message: String,
}

impl fmt::Display for InvalidRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit {}: {}", self.unit, self.message)
    }
}

impl Error for InvalidRecord {}

impl TryFrom<RentRollRow> for UnitRecord {
    type Error = InvalidRecord;

    fn try_from(row: RentRollRow) -> Result<Self, Self::Error> {
        let invalid = |message: String| InvalidRecord {
            unit: row.unit,
            message,
        };

        let status = UnitStatus::from_code(row.status.trim()).ok_or_else(|| {
            invalid(format!(
                "status '{}' is not one of O, VU, NU, VR",
                row.status
            ))
        })?;

        if let Some(sq_ft) = row.sq_ft
            && sq_ft < 0
        {
            return Err(invalid(format!("sq_ft must be non-negative, got {sq_ft}")));
        }
        ensure_non_negative(row.autobill, "monthly_rent").map_err(invalid)?;
        ensure_non_negative(row.deposit, "deposit").map_err(invalid)?;

        Ok(Self {
            unit: row.unit,
            name: row.name.unwrap_or_default(),
            unit_type: row.unit_type,
            sq_ft: row.sq_ft,
            monthly_rent: row.autobill,
            deposit: row.deposit,
            moved_in: row.moved_in,
            lease_ends: row.lease_ends,
            status,
        })
    }
}

fn ensure_non_negative(value: Option<f64>, field: &str) -> Result<(), String> {
    match value {
        Some(amount) if !amount.is_finite() || amount < 0.0 => Err(format!(
            "{field} must be a non-negative amount, got {amount}"
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> RentRollRow {
        RentRollRow {
            unit: 101,
            name: Some("Ada Tenant".to_string()),
            unit_type: "1x1.1".to_string(),
            sq_ft: Some(650),
            autobill: Some(1200.0),
            deposit: Some(500.0),
            moved_in: Some("01/01/2023".to_string()),
            lease_ends: Some("12/31/2025".to_string()),
            status: status.to_string(),
        }
    }

    #[test]
    fn status_codes_round_trip() {
        for status in UnitStatus::ALL {
            assert_eq!(UnitStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(UnitStatus::from_code("XX"), None);
    }

    #[test]
    fn source_row_maps_autobill_to_monthly_rent() {
        let record = UnitRecord::try_from(row("O")).expect("valid row");
        assert_eq!(record.monthly_rent, Some(1200.0));
        assert_eq!(record.status, UnitStatus::Occupied);
    }

    #[test]
    fn rejects_unknown_status() {
        let err = UnitRecord::try_from(row("X")).expect_err("status should be rejected");
        assert_eq!(err.unit, 101);
        assert!(err.message.contains("'X'"));
    }

    #[test]
    fn rejects_negative_rent() {
        let mut source = row("VR");
        source.autobill = Some(-1.0);
        let err = UnitRecord::try_from(source).expect_err("negative rent should be rejected");
        assert!(err.message.contains("monthly_rent"));
    }

    #[test]
    fn parses_export_field_names() {
        let line = r#"{"Unit":102,"Name":"","TYPE":"2x2.1","SQ FT":900,"AUTOBILL":1300,"DEPOSIT":null,"MOVED IN":"","LEASE ENDS":"","STATUS":"VR"}"#;
        let parsed: RentRollRow = serde_json::from_str(line).expect("row should parse");
        assert_eq!(parsed.unit, 102);
        assert_eq!(parsed.sq_ft, Some(900));
        assert_eq!(parsed.autobill, Some(1300.0));
        assert_eq!(parsed.deposit, None);
    }
}
