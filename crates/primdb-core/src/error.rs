//! Error types for all PrimDB operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::ColumnType;

/// Top-level error type for PrimDB operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

impl Error {
    /// True for the "table/column/row not found" family.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// True for schema and value validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupted document {}: {source}", path.display())]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize document {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid record in table '{table}': {reason}")]
    InvalidRecord { table: String, reason: String },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("table name must not be empty")]
    EmptyTableName,

    #[error("invalid table name '{0}': use letters, digits, '_' or '-'")]
    InvalidTableName(String),

    #[error("malformed column definition '{0}': expected <name>:<type>")]
    MalformedColumn(String),

    #[error("unknown column type '{0}': expected one of int, str, bool")]
    UnknownType(String),

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("column '{0}' is reserved and assigned automatically")]
    ReservedColumn(String),

    #[error("table '{table}' expects {expected} values, got {actual}")]
    ValueCount {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("value '{value}' is not valid for column '{column}' of type {expected}")]
    TypeMismatch {
        column: String,
        expected: ColumnType,
        value: String,
    },

    #[error("set clause must name at least one column")]
    EmptySetClause,
}

#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("table not found: {0}")]
    Table(String),

    #[error("column '{column}' not found in table '{table}'")]
    Column { table: String, column: String },

    #[error("table '{0}' has no rows")]
    EmptyTable(String),

    #[error("no rows in table '{0}' match the condition")]
    NoMatchingRows(String),
}

pub type Result<T> = std::result::Result<T, Error>;
