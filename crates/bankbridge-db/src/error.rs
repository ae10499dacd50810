//! Database error types

use thiserror::Error;

/// Database operation errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

impl DbError {
    /// Map a sqlx error, turning unique-constraint violations (SQLSTATE
    /// 23505) into [`DbError::Duplicate`] carrying the given description.
    pub fn from_sqlx(e: sqlx::Error, duplicate_message: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23505") {
                return DbError::Duplicate(duplicate_message.to_string());
            }
        }
        DbError::Query(e)
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;
