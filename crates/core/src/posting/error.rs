//! Posting error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while generating or validating postings.
#[derive(Debug, Error)]
pub enum PostingError {
    // ========== Validation Errors ==========
    /// Item references an item type that is not visible to the organization.
    /// Signals a tampered or stale client payload.
    #[error("Unknown transaction item type: {0}")]
    UnknownItemType(Uuid),

    /// Raw item amounts are entered as non-negative values.
    #[error("Item amount cannot be negative: {0}")]
    NegativeItemAmount(i64),

    /// Transfer source and destination must differ.
    #[error("Cannot transfer between an account and itself")]
    SameAccount,

    /// Transfer amounts must be positive.
    #[error("Transfer amount must be positive, got {0}")]
    NonPositiveTransferAmount(i64),

    /// Signed amounts overflowed 64-bit cents.
    #[error("Amount arithmetic overflowed")]
    AmountOverflow,

    // ========== Reference Data Errors ==========
    /// A required reference row (item type, method, or category) is missing.
    #[error("Missing reference data: {0}")]
    MissingReference(String),

    // ========== Database Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl PostingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownItemType(_) => "UNKNOWN_ITEM_TYPE",
            Self::NegativeItemAmount(_) => "NEGATIVE_ITEM_AMOUNT",
            Self::SameAccount => "SAME_ACCOUNT",
            Self::NonPositiveTransferAmount(_) => "NON_POSITIVE_TRANSFER_AMOUNT",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::MissingReference(_) => "MISSING_REFERENCE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::UnknownItemType(_)
            | Self::NegativeItemAmount(_)
            | Self::SameAccount
            | Self::NonPositiveTransferAmount(_)
            | Self::AmountOverflow => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::TransactionNotFound(_) => 404,

            // 500 Internal Server Error
            Self::MissingReference(_) | Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PostingError::UnknownItemType(Uuid::nil()).error_code(),
            "UNKNOWN_ITEM_TYPE"
        );
        assert_eq!(PostingError::SameAccount.error_code(), "SAME_ACCOUNT");
        assert_eq!(
            PostingError::NonPositiveTransferAmount(0).error_code(),
            "NON_POSITIVE_TRANSFER_AMOUNT"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(PostingError::SameAccount.http_status_code(), 400);
        assert_eq!(
            PostingError::AccountNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(
            PostingError::Database("down".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            PostingError::NonPositiveTransferAmount(-5).to_string(),
            "Transfer amount must be positive, got -5"
        );
        assert_eq!(
            PostingError::SameAccount.to_string(),
            "Cannot transfer between an account and itself"
        );
    }
}
