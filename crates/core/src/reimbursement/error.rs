//! Reimbursement error types.

use thiserror::Error;
use uuid::Uuid;

use super::types::RequestStatus;

/// Errors that can occur during reimbursement request transitions.
#[derive(Debug, Error)]
pub enum ReimbursementError {
    // ========== Transition Errors ==========
    /// The requested status change is not a legal transition.
    #[error("Cannot transition reimbursement request from {from} to {to}")]
    InvalidTransition {
        /// The request's current status.
        from: RequestStatus,
        /// The requested target status.
        to: RequestStatus,
    },

    // ========== Approval Validation Errors ==========
    /// Approval requires an account to draw from.
    #[error("An account is required to approve a reimbursement")]
    AccountRequired,

    /// Approval requires a category for the offsetting transaction.
    #[error("A category is required to approve a reimbursement")]
    CategoryRequired,

    /// Approval amounts must be positive.
    #[error("Approval amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    /// The target status string was not recognized.
    #[error("Unknown reimbursement status: {0}")]
    UnknownStatus(String),

    // ========== Database Errors ==========
    /// Reimbursement request not found.
    #[error("Reimbursement request not found: {0}")]
    RequestNotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ReimbursementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::AccountRequired => "ACCOUNT_REQUIRED",
            Self::CategoryRequired => "CATEGORY_REQUIRED",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::UnknownStatus(_) => "UNKNOWN_STATUS",
            Self::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InvalidTransition { .. }
            | Self::AccountRequired
            | Self::CategoryRequired
            | Self::NonPositiveAmount(_)
            | Self::UnknownStatus(_) => 400,

            // 404 Not Found
            Self::RequestNotFound(_) | Self::AccountNotFound(_) => 404,

            // 500 Internal Server Error
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ReimbursementError::InvalidTransition {
                from: RequestStatus::Approved,
                to: RequestStatus::Rejected,
            }
            .error_code(),
            "INVALID_TRANSITION"
        );
        assert_eq!(
            ReimbursementError::AccountRequired.error_code(),
            "ACCOUNT_REQUIRED"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            ReimbursementError::CategoryRequired.http_status_code(),
            400
        );
        assert_eq!(
            ReimbursementError::RequestNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(
            ReimbursementError::Database("down".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_error_display() {
        let err = ReimbursementError::InvalidTransition {
            from: RequestStatus::Approved,
            to: RequestStatus::Rejected,
        };
        assert_eq!(
            err.to_string(),
            "Cannot transition reimbursement request from approved to rejected"
        );
    }
}
