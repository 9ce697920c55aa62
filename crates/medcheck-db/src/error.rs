//! Database error types.

use medcheck_common::MedcheckError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

impl From<argon2::password_hash::Error> for DbError {
    fn from(err: argon2::password_hash::Error) -> Self {
        DbError::PasswordHash(err.to_string())
    }
}

impl From<MedcheckError> for DbError {
    fn from(err: MedcheckError) -> Self {
        match err {
            MedcheckError::Validation(msg) => DbError::Validation(msg),
            MedcheckError::NotFound(msg) => DbError::NotFound(msg),
            other => DbError::Corrupt(other.to_string()),
        }
    }
}

/// True when SQLite rejected a write because of a UNIQUE / PRIMARY KEY clash.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
