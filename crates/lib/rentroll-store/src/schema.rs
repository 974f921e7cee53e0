pub const TABLE_RENT_ROLL: &str = "rent_roll";

/// URI of the read-only schema overview resource.
pub const SCHEMA_RESOURCE_URI: &str = "schema://rent_roll";

pub const STATUS_OCCUPIED: &str = "O";
pub const STATUS_VACANT_UNIT: &str = "VU";
pub const STATUS_NOTICE_UNKNOWN: &str = "NU";
pub const STATUS_VACANT_READY: &str = "VR";

/// Idempotent DDL for the rent roll table and its indexes.
pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS rent_roll (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    unit INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL DEFAULT '',
    type TEXT NOT NULL,
    sq_ft INTEGER,
    monthly_rent REAL,
    deposit REAL,
    moved_in TEXT,
    lease_ends TEXT,
    status TEXT NOT NULL CHECK (status IN ('O', 'VU', 'NU', 'VR')),
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_unit ON rent_roll(unit);
CREATE INDEX IF NOT EXISTS idx_status ON rent_roll(status);
CREATE INDEX IF NOT EXISTS idx_type ON rent_roll(type);
";

/// Column guide shown to callers composing pass-through queries.
pub const COLUMN_GUIDE: &[(&str, &str)] = &[
    ("unit", "Unit number"),
    ("name", "Tenant name"),
    ("type", "Unit type (1x1.1, 1x1.2, 1x1.3, 2x2.1, etc.)"),
    ("sq_ft", "Square footage"),
    ("monthly_rent", "Monthly rent amount"),
    ("deposit", "Security deposit"),
    ("moved_in", "Move-in date"),
    ("lease_ends", "Lease end date"),
    ("status", "Occupancy status"),
];
