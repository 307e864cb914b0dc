//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)     CoreError (cart, auth)   csv / io       │
//! │       │                              │                      │           │
//! │       └──────────────┬───────────────┴──────────────────────┘           │
//! │                      ▼                                                  │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CliError (in apps/cli) ← One line on stderr, non-zero exit            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::error::ErrorKind;
use tally_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate SKU
    /// - Creating a user whose username is taken
    /// - Adding a category or supplier name twice
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Checkout line referencing a product that does not exist
    /// - Deleting a product that sales or stock history still reference
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// CHECK or NOT NULL constraint failed (e.g. a zero sale quantity).
    #[error("Constraint failed: {0}")]
    Constraint(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored value could not be decoded (e.g. a price column that is not
    /// a decimal).
    #[error("Corrupt {column} value: '{value}'")]
    Corrupt { column: String, value: String },

    /// Business rule failure raised by tally-core (empty cart, validation).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// CSV read/write failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File system failure during import/export.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a Corrupt error for an undecodable column.
    pub fn corrupt(column: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::Corrupt {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Replaces the generic unique-violation context with the business key
    /// the caller was writing.
    pub fn with_duplicate_key(self, field: &str, value: &str) -> Self {
        match self {
            DbError::UniqueViolation { .. } => DbError::duplicate(field, value),
            other => other,
        }
    }
}

/// Maps sqlx failures onto store errors.
///
/// ```text
/// RowNotFound                     → NotFound
/// Database, kind UniqueViolation  → UniqueViolation (field = "table.column")
/// Database, kind ForeignKey...    → ForeignKeyViolation
/// Database, CHECK / NOT NULL      → Constraint
/// Database, anything else         → QueryFailed
/// PoolTimedOut                    → PoolExhausted
/// PoolClosed                      → ConnectionFailed
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => {
                        // "UNIQUE constraint failed: products.sku"
                        let field = message
                            .rsplit_once(": ")
                            .map(|(_, column)| column.to_string())
                            .unwrap_or_else(|| "value".to_string());
                        DbError::duplicate(field, "unknown")
                    }
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                        DbError::Constraint(message)
                    }
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Core(CoreError::Validation(err))
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
