use std::{error::Error, fmt, io};

use rentroll_store::models::InvalidRecord;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::parsers::JsonlParseError;
use crate::render::ToolOutput;
use crate::store::{SqliteRentRollStore, StoreError};

pub mod catalog;
pub mod dispatch;
pub mod ingest;
pub mod overview;

pub use catalog::{ArgSpec, ArgType, Operation, OperationKind};
pub use ingest::JsonlIngestReport;

/// Stable tags for every failure a caller can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownOperation,
    InvalidArgument,
    QueryError,
    IntegrityError,
    IoError,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownOperation => "unknown_operation",
            Self::InvalidArgument => "invalid_argument",
            Self::QueryError => "query_error",
            Self::IntegrityError => "integrity_error",
            Self::IoError => "io_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a catalog call or resource read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    UnknownOperation(String),
    InvalidArgument {
        field: &'static str,
        reason: String,
    },
    Query(String),
}

impl DispatchError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownOperation(_) => ErrorKind::UnknownOperation,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Query(_) => ErrorKind::QueryError,
        }
    }

    /// Human-readable detail without the kind prefix.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::UnknownOperation(name) => format!("Unknown tool: {name}"),
            Self::InvalidArgument { reason, .. } => reason.clone(),
            Self::Query(message) => message.clone(),
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.detail())
    }
}

impl Error for DispatchError {}

impl From<StoreError> for DispatchError {
    fn from(err: StoreError) -> Self {
        Self::Query(err.engine_message())
    }
}

/// Failure while loading source records.
#[derive(Debug)]
pub enum ControlError {
    Io(io::Error),
    Parse(JsonlParseError),
    Store(StoreError),
}

impl ControlError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::IoError,
            Self::Parse(_) | Self::Store(StoreError::Integrity(_)) => ErrorKind::IntegrityError,
            Self::Store(_) => ErrorKind::QueryError,
        }
    }
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read export: {err}"),
            Self::Parse(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<io::Error> for ControlError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<JsonlParseError> for ControlError {
    fn from(err: JsonlParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<StoreError> for ControlError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<InvalidRecord> for ControlError {
    fn from(err: InvalidRecord) -> Self {
        Self::Store(StoreError::Integrity(err.to_string()))
    }
}

/// Entry point for catalog calls, resource reads, and bulk loads.
#[derive(Clone)]
pub struct RentRollControlPlane {
    store: SqliteRentRollStore,
}

impl RentRollControlPlane {
    #[must_use]
    pub const fn new(store: SqliteRentRollStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub const fn store(&self) -> &SqliteRentRollStore {
        &self.store
    }

    /// Validates and runs a catalog call by name.
    ///
    /// Validation happens before any store access.
    ///
    /// # Errors
    /// Returns `DispatchError` when the name is unknown, an argument is invalid,
    /// or the store rejects the statement.
    pub fn call(
        &self,
        name: &str,
        args: Option<&Map<String, Value>>,
    ) -> Result<ToolOutput, DispatchError> {
        let operation = Operation::parse(name, args).inspect_err(|err| {
            warn!(operation = name, kind = %err.kind(), "rejected call: {}", err.detail());
        })?;
        self.execute(&operation)
    }

    /// Runs an already validated operation.
    ///
    /// # Errors
    /// Returns `DispatchError::Query` with the engine message when the store fails.
    pub fn execute(&self, operation: &Operation) -> Result<ToolOutput, DispatchError> {
        let name = operation.kind().name();
        debug!(operation = name, "executing operation");
        match dispatch::run(&self.store, operation) {
            Ok(output) => {
                info!(operation = name, "operation completed");
                Ok(output)
            }
            Err(err) => {
                let err = DispatchError::from(err);
                warn!(operation = name, kind = %err.kind(), "operation failed: {}", err.detail());
                Err(err)
            }
        }
    }

    /// Markdown text of the schema overview resource.
    ///
    /// # Errors
    /// Returns `DispatchError::Query` when the store fails.
    pub fn schema_overview(&self) -> Result<String, DispatchError> {
        let overview = overview::load(&self.store)?;
        Ok(crate::render::schema_overview(&overview))
    }
}
