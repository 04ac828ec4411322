//! Payment error types for validation and state errors.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::PaymentStatus;

/// Errors that can occur during payment operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    // ========== Validation Errors ==========
    /// Payment amount must be positive.
    #[error("Payment amount must be positive")]
    NonPositiveAmount,

    /// Refund amount must be positive and within the captured amount.
    #[error("Refund of {requested} exceeds captured amount {captured}")]
    RefundExceedsAmount {
        /// Requested refund amount.
        requested: Decimal,
        /// Amount originally captured.
        captured: Decimal,
    },

    // ========== State Errors ==========
    /// Operation not permitted in the payment's current status.
    #[error("Payment is {current}, expected {expected}")]
    InvalidState {
        /// Current payment status.
        current: PaymentStatus,
        /// Status the operation requires.
        expected: PaymentStatus,
    },

    /// The requested status transition is not allowed.
    #[error("Cannot transition payment from {from} to {to}")]
    InvalidTransition {
        /// Current payment status.
        from: PaymentStatus,
        /// Requested payment status.
        to: PaymentStatus,
    },

    // ========== Missing Data ==========
    /// No gateway charge is on record for this payment.
    #[error("Payment has no charge id on record")]
    MissingCharge,
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::RefundExceedsAmount { .. } => "REFUND_EXCEEDS_AMOUNT",
            Self::InvalidState { .. } => "INVALID_PAYMENT_STATE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::MissingCharge => "MISSING_CHARGE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::NonPositiveAmount | Self::RefundExceedsAmount { .. } => 400,

            // 422 Unprocessable - state machine violations
            Self::InvalidState { .. } | Self::InvalidTransition { .. } | Self::MissingCharge => 422,
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
            PaymentError::NonPositiveAmount.error_code(),
            "NON_POSITIVE_AMOUNT"
        );
        assert_eq!(
            PaymentError::InvalidState {
                current: PaymentStatus::Pending,
                expected: PaymentStatus::Completed,
            }
            .error_code(),
            "INVALID_PAYMENT_STATE"
        );
        assert_eq!(PaymentError::MissingCharge.error_code(), "MISSING_CHARGE");
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(PaymentError::NonPositiveAmount.http_status_code(), 400);
        assert_eq!(PaymentError::MissingCharge.http_status_code(), 422);
        assert_eq!(
            PaymentError::InvalidTransition {
                from: PaymentStatus::Failed,
                to: PaymentStatus::Completed,
            }
            .http_status_code(),
            422
        );
    }

    #[test]
    fn test_error_display() {
        let err = PaymentError::InvalidState {
            current: PaymentStatus::Pending,
            expected: PaymentStatus::Completed,
        };
        assert_eq!(err.to_string(), "Payment is pending, expected completed");

        let err = PaymentError::RefundExceedsAmount {
            requested: dec!(60.00),
            captured: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "Refund of 60.00 exceeds captured amount 50.00"
        );
    }
}
