use std::{
    error::Error,
    fmt,
    path::Path,
    sync::{Arc, Mutex},
};

use rentroll_store::models::UnitRecord;
use rentroll_store::schema::SCHEMA_SQL;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Batch, Connection, ErrorCode, params, params_from_iter};
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

/// A result row keyed by column name, in column order.
pub type Row = Map<String, Value>;

#[derive(Debug)]
pub enum StoreError {
    Sqlite(Box<rusqlite::Error>),
    Integrity(String),
    Unavailable(&'static str),
    MultipleStatements,
}

impl StoreError {
    /// Message reported by the storage engine, without the store prefix.
    #[must_use]
    pub fn engine_message(&self) -> String {
        match self {
            Self::Sqlite(err) => err.to_string(),
            Self::Integrity(message) => message.clone(),
            Self::Unavailable(message) => (*message).to_string(),
            Self::MultipleStatements => MULTIPLE_STATEMENTS.to_string(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "SQLite error: {err}"),
            Self::Integrity(message) => write!(f, "Integrity error: {message}"),
            Self::Unavailable(message) => write!(f, "Store unavailable: {message}"),
            Self::MultipleStatements => write!(f, "SQLite error: {MULTIPLE_STATEMENTS}"),
        }
    }
}

impl Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

const MULTIPLE_STATEMENTS: &str = "only one statement may be executed at a time";

const UPSERT_UNIT_SQL: &str = "
INSERT INTO rent_roll (
    unit, name, type, sq_ft, monthly_rent, deposit,
    moved_in, lease_ends, status, updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, CURRENT_TIMESTAMP)
ON CONFLICT(unit) DO UPDATE SET
    name = excluded.name,
    type = excluded.type,
    sq_ft = excluded.sq_ft,
    monthly_rent = excluded.monthly_rent,
    deposit = excluded.deposit,
    moved_in = excluded.moved_in,
    lease_ends = excluded.lease_ends,
    status = excluded.status,
    updated_at = CURRENT_TIMESTAMP";

/// `SQLite`-backed store for the `rent_roll` table.
///
/// Clones share one connection; statements never interleave.
#[derive(Clone)]
pub struct SqliteRentRollStore {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteRentRollStore {
    /// Opens or creates a database file and ensures the schema exists.
    ///
    /// # Errors
    /// Returns `StoreError` if the file cannot be opened or the schema fails to apply.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened rent roll database");
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database with the schema applied.
    ///
    /// # Errors
    /// Returns `StoreError` if the schema fails to apply.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wraps an existing connection, creating the schema if needed.
    ///
    /// # Errors
    /// Returns `StoreError` if the schema fails to apply.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Runs one statement with positional binds and collects every row.
    ///
    /// Trailing whitespace, comments, and semicolons are allowed after the
    /// statement; a second statement is not.
    ///
    /// # Errors
    /// Returns `StoreError::Sqlite` carrying the engine message when the statement
    /// is rejected, `StoreError::MultipleStatements` when `sql` holds more than
    /// one, or `StoreError::Unavailable` after `close`.
    pub fn execute(&self, sql: &str, params: &[SqlValue]) -> StoreResult<Vec<Row>> {
        self.with_conn(|conn| {
            ensure_single_statement(conn, sql)?;
            let mut stmt = conn.prepare(sql)?;
            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let mut rows = stmt.query(params_from_iter(params.iter()))?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                let mut record = Map::with_capacity(columns.len());
                for (index, column) in columns.iter().enumerate() {
                    record.insert(column.clone(), to_json(row.get_ref(index)?));
                }
                records.push(record);
            }
            debug!(rows = records.len(), "statement executed");
            Ok(records)
        })
    }

    /// Upserts a batch of units keyed by `unit` in a single transaction.
    ///
    /// Existing rows keep `created_at` and get a fresh `updated_at`.
    ///
    /// # Errors
    /// Returns `StoreError::Integrity` when a constraint rejects a row; nothing
    /// from the batch is committed in that case.
    pub fn upsert_units(&self, records: &[UnitRecord]) -> StoreResult<usize> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(UPSERT_UNIT_SQL)?;
                for record in records {
                    stmt.execute(params![
                        record.unit,
                        record.name,
                        record.unit_type,
                        record.sq_ft,
                        record.monthly_rent,
                        record.deposit,
                        record.moved_in,
                        record.lease_ends,
                        record.status.code(),
                    ])
                    .map_err(|err| map_write_err(err, record.unit))?;
                }
            }
            tx.commit()?;
            Ok(records.len())
        })
    }

    /// Closes the underlying connection. Later calls fail as unavailable.
    ///
    /// # Errors
    /// Returns `StoreError` if `SQLite` refuses to close the handle.
    pub fn close(&self) -> StoreResult<()> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned"))?;
        let Some(conn) = guard.take() else {
            return Ok(());
        };
        conn.close().map_err(|(_, err)| StoreError::from(err))?;
        info!("closed rent roll database");
        Ok(())
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned"))?;
        let conn = guard
            .as_mut()
            .ok_or(StoreError::Unavailable("store has been closed"))?;
        f(conn)
    }
}

/// `prepare` compiles the first statement and silently drops the rest.
fn ensure_single_statement(conn: &Connection, sql: &str) -> StoreResult<()> {
    let mut batch = Batch::new(conn, sql);
    if batch.next()?.is_some() && batch.next()?.is_some() {
        return Err(StoreError::MultipleStatements);
    }
    Ok(())
}

fn map_write_err(err: rusqlite::Error, unit: i64) -> StoreError {
    match err.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => {
            StoreError::Integrity(format!("unit {unit}: {err}"))
        }
        _ => StoreError::from(err),
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(number) => Value::from(number),
        ValueRef::Real(number) => Number::from_f64(number).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().copied().map(Value::from).collect()),
    }
}
