//! Storage error model.

use thiserror::Error;

/// Failure of a storage operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The engine rejected a write because the email is already taken.
    #[error("a user with this email already exists")]
    DuplicateEmail,

    /// The database URL could not be understood.
    #[error("invalid database url: {0}")]
    InvalidUrl(String),

    /// Any other engine or connection failure.
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        // `email` is the only unique column a write can collide on.
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::DuplicateEmail;
            }
        }
        Self::Database(err)
    }
}
