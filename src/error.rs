use thiserror::Error;
use tracing::error;

use crate::domain::models::booking::BookingStatus;
use crate::domain::services::transitions::Operation;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Cannot {operation} a booking in status {status}")]
    InvalidState {
        operation: Operation,
        status: BookingStatus,
    },
    #[error("Write conflict: {0}")]
    WriteConflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errors that are expected to go away when the operation is retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::WriteConflict(_))
    }

    /// The booking status reported back with an `InvalidState` rejection.
    pub fn current_status(&self) -> Option<BookingStatus> {
        match self {
            AppError::InvalidState { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        error!(detail = %detail, "Internal error");
        AppError::Internal(detail)
    }

    pub(crate) fn corrupt_row(detail: impl Into<String>) -> Self {
        AppError::internal(format!("corrupt booking row: {}", detail.into()))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        error!(error = %err, "Database error");
        AppError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_write_conflicts_are_transient() {
        assert!(AppError::WriteConflict("stale".into()).is_transient());
        assert!(!AppError::NotFound("Booking not found".into()).is_transient());
        assert!(!AppError::Forbidden("no".into()).is_transient());
        assert!(!AppError::Validation("bad".into()).is_transient());
    }

    #[test]
    fn test_driver_errors_classify_as_database() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Database(sqlx::Error::PoolTimedOut)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_corrupt_row_is_internal() {
        let err = AppError::corrupt_row("booking b1 has status \"pending\"");
        assert!(matches!(err, AppError::Internal(ref d) if d.contains("b1")));
    }

    #[test]
    fn test_invalid_state_reports_current_status() {
        let err = AppError::InvalidState {
            operation: Operation::Pay,
            status: BookingStatus::WaitingConfirmation,
        };
        assert_eq!(err.current_status(), Some(BookingStatus::WaitingConfirmation));
        assert_eq!(err.to_string(), "Cannot pay a booking in status waiting_confirmation");
    }
}
