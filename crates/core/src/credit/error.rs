//! Credit error types for validation and state errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::TransactionStatus;

/// Errors that can occur during credit operations.
#[derive(Debug, Error)]
pub enum CreditError {
    // ========== Validation Errors ==========
    /// Credit limit cannot be negative.
    #[error("Credit limit cannot be negative")]
    NegativeLimit,

    /// Charge amount must be positive.
    #[error("Charge amount must be positive")]
    NonPositiveAmount,

    /// Charge fee cannot be negative.
    #[error("Charge fee cannot be negative")]
    NegativeFee,

    /// Balance override cannot be negative.
    #[error("Balance cannot be negative")]
    NegativeBalance,

    // ========== Limit Errors ==========
    /// Applying the charge would push the balance past the credit limit.
    #[error(
        "Charge of {requested} exceeds credit limit. Balance: {balance}, limit: {limit}"
    )]
    LimitExceeded {
        /// Current account balance (amount owed).
        balance: Decimal,
        /// The account's credit limit.
        limit: Decimal,
        /// The requested charge amount.
        requested: Decimal,
    },

    // ========== Account State Errors ==========
    /// Account is suspended and rejects charges.
    #[error("Credit account {0} is suspended")]
    AccountSuspended(Uuid),

    /// Account is frozen and rejects charges.
    #[error("Credit account {0} is frozen")]
    AccountFrozen(Uuid),

    // ========== Transaction State Errors ==========
    /// The requested status transition is not allowed.
    #[error("Cannot transition credit transaction from {from} to {to}")]
    InvalidTransition {
        /// Current transaction status.
        from: TransactionStatus,
        /// Requested transaction status.
        to: TransactionStatus,
    },
}

impl CreditError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeLimit => "NEGATIVE_LIMIT",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::NegativeFee => "NEGATIVE_FEE",
            Self::NegativeBalance => "NEGATIVE_BALANCE",
            Self::LimitExceeded { .. } => "CREDIT_LIMIT_EXCEEDED",
            Self::AccountSuspended(_) => "ACCOUNT_SUSPENDED",
            Self::AccountFrozen(_) => "ACCOUNT_FROZEN",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::NegativeLimit
            | Self::NonPositiveAmount
            | Self::NegativeFee
            | Self::NegativeBalance => 400,

            // 422 Unprocessable - business rule violations
            Self::LimitExceeded { .. }
            | Self::AccountSuspended(_)
            | Self::AccountFrozen(_)
            | Self::InvalidTransition { .. } => 422,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CreditError::LimitExceeded {
                balance: dec!(85.50),
                limit: dec!(100.00),
                requested: dec!(20.00),
            }
            .error_code(),
            "CREDIT_LIMIT_EXCEEDED"
        );
        assert_eq!(CreditError::NegativeLimit.error_code(), "NEGATIVE_LIMIT");
        assert_eq!(
            CreditError::AccountFrozen(Uuid::nil()).error_code(),
            "ACCOUNT_FROZEN"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(CreditError::NonPositiveAmount.http_status_code(), 400);
        assert_eq!(
            CreditError::LimitExceeded {
                balance: dec!(0),
                limit: dec!(0),
                requested: dec!(1),
            }
            .http_status_code(),
            422
        );
        assert_eq!(
            CreditError::AccountSuspended(Uuid::nil()).http_status_code(),
            422
        );
    }

    #[test]
    fn test_limit_exceeded_display() {
        let err = CreditError::LimitExceeded {
            balance: dec!(85.50),
            limit: dec!(100.00),
            requested: dec!(20.00),
        };
        assert_eq!(
            err.to_string(),
            "Charge of 20.00 exceeds credit limit. Balance: 85.50, limit: 100.00"
        );
    }
}
