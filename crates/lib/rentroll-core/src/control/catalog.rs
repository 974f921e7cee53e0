//! The fixed operation catalog and argument validation.

use serde_json::{Map, Value, json};

use super::DispatchError;

/// Scalar type of a catalog argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    String,
}

impl ArgType {
    #[must_use]
    pub const fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
        }
    }
}

/// One argument accepted by an operation. Every catalog argument is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub arg_type: ArgType,
    pub description: &'static str,
}

const UNIT_TYPE_ARG: ArgSpec = ArgSpec {
    name: "unit_type",
    arg_type: ArgType::String,
    description: "Unit type: \"1-bedroom\" or \"2-bedroom\" or specific like \"1x1.1\" (matched as a literal substring)",
};

const NAME_ARG: ArgSpec = ArgSpec {
    name: "name",
    arg_type: ArgType::String,
    description: "Tenant name to search for (case-insensitive substring; % and _ match literally, not as wildcards)",
};

const YEAR_ARG: ArgSpec = ArgSpec {
    name: "year",
    arg_type: ArgType::String,
    description: "Year to check (e.g., \"2025\")",
};

const SQL_ARG: ArgSpec = ArgSpec {
    name: "sql",
    arg_type: ArgType::String,
    description: "SQL query to execute verbatim against the rent_roll table (trusted callers only)",
};

/// Catalog entries, independent of their arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    VacantUnits,
    OccupancyStats,
    UnitsByType,
    TenantsByName,
    LeaseExpirations,
    RevenueAnalysis,
    CustomSql,
}

impl OperationKind {
    pub const ALL: [Self; 7] = [
        Self::VacantUnits,
        Self::OccupancyStats,
        Self::UnitsByType,
        Self::TenantsByName,
        Self::LeaseExpirations,
        Self::RevenueAnalysis,
        Self::CustomSql,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::VacantUnits => "get_vacant_units",
            Self::OccupancyStats => "get_occupancy_stats",
            Self::UnitsByType => "search_units_by_type",
            Self::TenantsByName => "search_by_tenant_name",
            Self::LeaseExpirations => "get_lease_expirations",
            Self::RevenueAnalysis => "get_revenue_analysis",
            Self::CustomSql => "custom_sql_query",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::VacantUnits => "Get all vacant rental units",
            Self::OccupancyStats => "Get occupancy rate and statistics",
            Self::UnitsByType => "Search for units by type (1-bedroom, 2-bedroom, etc.)",
            Self::TenantsByName => {
                "Search for units by tenant name. Matches any name containing the text; % and _ are matched literally."
            }
            Self::LeaseExpirations => "Get leases expiring in a specific year",
            Self::RevenueAnalysis => "Get rental revenue analysis",
            Self::CustomSql => {
                "Execute a custom SQL query on the rent roll data. Runs verbatim with no restrictions."
            }
        }
    }

    #[must_use]
    pub const fn args(self) -> &'static [ArgSpec] {
        match self {
            Self::VacantUnits | Self::OccupancyStats | Self::RevenueAnalysis => &[],
            Self::UnitsByType => &[UNIT_TYPE_ARG],
            Self::TenantsByName => &[NAME_ARG],
            Self::LeaseExpirations => &[YEAR_ARG],
            Self::CustomSql => &[SQL_ARG],
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// JSON Schema object describing this operation's arguments.
    #[must_use]
    pub fn input_schema(self) -> Map<String, Value> {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for arg in self.args() {
            properties.insert(
                arg.name.to_string(),
                json!({
                    "type": arg.arg_type.json_type(),
                    "description": arg.description,
                }),
            );
            required.push(Value::from(arg.name));
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::from("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), Value::Array(required));
        schema
    }
}

/// A validated call, carrying its typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    VacantUnits,
    OccupancyStats,
    UnitsByType { unit_type: String },
    TenantsByName { name: String },
    LeaseExpirations { year: String },
    RevenueAnalysis,
    CustomSql { sql: String },
}

impl Operation {
    /// Looks up `name` in the catalog and validates `args` against its schema.
    ///
    /// Extra arguments are ignored.
    ///
    /// # Errors
    /// Returns `DispatchError::UnknownOperation` for names outside the catalog and
    /// `DispatchError::InvalidArgument` for a missing or mistyped argument.
    pub fn parse(name: &str, args: Option<&Map<String, Value>>) -> Result<Self, DispatchError> {
        let kind = OperationKind::from_name(name)
            .ok_or_else(|| DispatchError::UnknownOperation(name.to_string()))?;
        let operation = match kind {
            OperationKind::VacantUnits => Self::VacantUnits,
            OperationKind::OccupancyStats => Self::OccupancyStats,
            OperationKind::RevenueAnalysis => Self::RevenueAnalysis,
            OperationKind::UnitsByType => Self::UnitsByType {
                unit_type: required_string(args, &UNIT_TYPE_ARG)?,
            },
            OperationKind::TenantsByName => Self::TenantsByName {
                name: required_string(args, &NAME_ARG)?,
            },
            OperationKind::LeaseExpirations => Self::LeaseExpirations {
                year: required_string(args, &YEAR_ARG)?,
            },
            OperationKind::CustomSql => Self::CustomSql {
                sql: required_string(args, &SQL_ARG)?,
            },
        };
        Ok(operation)
    }

    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::VacantUnits => OperationKind::VacantUnits,
            Self::OccupancyStats => OperationKind::OccupancyStats,
            Self::UnitsByType { .. } => OperationKind::UnitsByType,
            Self::TenantsByName { .. } => OperationKind::TenantsByName,
            Self::LeaseExpirations { .. } => OperationKind::LeaseExpirations,
            Self::RevenueAnalysis => OperationKind::RevenueAnalysis,
            Self::CustomSql { .. } => OperationKind::CustomSql,
        }
    }
}

fn required_string(
    args: Option<&Map<String, Value>>,
    arg: &ArgSpec,
) -> Result<String, DispatchError> {
    match args.and_then(|args| args.get(arg.name)) {
        Some(Value::String(value)) => Ok(value.clone()),
        None | Some(Value::Null) => Err(DispatchError::InvalidArgument {
            field: arg.name,
            reason: format!("{} is required", arg.name),
        }),
        Some(other) => Err(DispatchError::InvalidArgument {
            field: arg.name,
            reason: format!(
                "{} must be a {}, got {}",
                arg.name,
                arg.arg_type.json_type(),
                json_type_name(other)
            ),
        }),
    }
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
