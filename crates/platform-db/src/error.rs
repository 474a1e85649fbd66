//! Store error types and result alias.
//!
//! Every backend maps its internal failures onto [`StoreError`]. The use-case
//! layer turns them into [`AppError`]s with [`StoreError::into_app_error`].

use anyhow::anyhow;
use thiserror::Error;

use platform_core::AppError;

/// Postgres SQLSTATE `numeric_value_out_of_range`.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested row does not exist (or a referenced row is missing).
    #[error("{entity} not found")]
    NotFound {
        /// Human-readable entity name, e.g. `"User"`.
        entity: &'static str,
    },

    /// A uniqueness constraint was violated.
    #[error("{entity} already exists")]
    Conflict { entity: &'static str },

    /// A numeric column would leave its representable range.
    #[error("{entity} value out of range")]
    OutOfRange { entity: &'static str },

    /// Any other backend failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn conflict(entity: &'static str) -> Self {
        Self::Conflict { entity }
    }

    pub fn out_of_range(entity: &'static str) -> Self {
        Self::OutOfRange { entity }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Maps a sqlx error for a statement touching `entity`.
    ///
    /// Missing rows and foreign-key violations become `NotFound`, unique
    /// violations become `Conflict`, numeric overflow becomes `OutOfRange`.
    pub fn from_sqlx(err: sqlx::Error, entity: &'static str) -> Self {
        Self::from_sqlx_referencing(err, entity, |_| entity)
    }

    /// Like [`from_sqlx`](Self::from_sqlx), but names the referenced entity
    /// on a foreign-key violation. `referenced` receives the violated
    /// constraint name, if the driver reports one.
    pub fn from_sqlx_referencing(
        err: sqlx::Error,
        entity: &'static str,
        referenced: impl FnOnce(Option<&str>) -> &'static str,
    ) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return Self::not_found(entity);
        }
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::conflict(entity);
            }
            if db.is_foreign_key_violation() {
                return Self::not_found(referenced(db.constraint()));
            }
            if db.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) {
                return Self::out_of_range(entity);
            }
        }
        Self::Database(err)
    }

    /// Normalizes the error for the HTTP boundary. Backend details stay in
    /// the error chain for logging and never reach the client.
    pub fn into_app_error(self) -> AppError {
        match self {
            Self::NotFound { .. } => AppError::not_found(anyhow!(self.to_string())),
            Self::Conflict { .. } => AppError::conflict(anyhow!(self.to_string())),
            Self::OutOfRange { .. } => AppError::bad_request(anyhow!(self.to_string())),
            Self::Database(_) => AppError::database(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = StoreError::from_sqlx(sqlx::Error::RowNotFound, "User");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "User not found");
    }

    #[test]
    fn test_into_app_error_statuses() {
        assert_eq!(
            StoreError::not_found("Service")
                .into_app_error()
                .status
                .as_u16(),
            404
        );
        assert_eq!(
            StoreError::conflict("User").into_app_error().status.as_u16(),
            409
        );
        assert_eq!(
            StoreError::out_of_range("Usage log")
                .into_app_error()
                .status
                .as_u16(),
            400
        );
        assert_eq!(
            StoreError::Database(sqlx::Error::PoolTimedOut)
                .into_app_error()
                .status
                .as_u16(),
            500
        );
    }
}
