//! Domain types for payments and gateway intents.

use serde::{Deserialize, Serialize};

/// Status of a local payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment attempt created, outcome unknown.
    Pending,
    /// Funds captured.
    Completed,
    /// Attempt failed or was canceled.
    Failed,
    /// Previously completed payment was refunded.
    Refunded,
}

impl PaymentStatus {
    /// Returns true if no further gateway-driven transition applies.
    ///
    /// `completed` is terminal with respect to the gateway but may still
    /// move to `refunded` through an explicit refund.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Refunded)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Refunded => write!(f, "refunded"),
        }
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payment through the gateway.
    Card,
    /// Cash at the counter.
    Cash,
    /// Bank transfer.
    Transfer,
    /// ACH debit.
    Ach,
    /// Tenant-defined method.
    Custom,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Card => write!(f, "card"),
            Self::Cash => write!(f, "cash"),
            Self::Transfer => write!(f, "transfer"),
            Self::Ach => write!(f, "ach"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Gateway-side status of a payment intent.
///
/// Parsed from the gateway's wire representation; unrecognized values fold
/// into `Other` so new gateway statuses never break deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    /// Funds captured.
    Succeeded,
    /// Attempt failed; a new payment method is required.
    RequiresPaymentMethod,
    /// Awaiting client-side confirmation.
    RequiresConfirmation,
    /// Awaiting additional customer action (e.g., 3DS).
    RequiresAction,
    /// Gateway is processing.
    Processing,
    /// Intent was canceled.
    Canceled,
    /// Any status this system does not recognize.
    #[serde(other)]
    Other,
}

impl std::str::FromStr for IntentStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "succeeded" => Self::Succeeded,
            "requires_payment_method" => Self::RequiresPaymentMethod,
            "requires_confirmation" => Self::RequiresConfirmation,
            "requires_action" => Self::RequiresAction,
            "processing" => Self::Processing,
            "canceled" => Self::Canceled,
            _ => Self::Other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_terminal_statuses() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Completed.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(PaymentStatus::Refunded.is_terminal());
    }

    #[test]
    fn test_intent_status_parsing() {
        assert_eq!(
            IntentStatus::from_str("succeeded").unwrap(),
            IntentStatus::Succeeded
        );
        assert_eq!(
            IntentStatus::from_str("requires_payment_method").unwrap(),
            IntentStatus::RequiresPaymentMethod
        );
        assert_eq!(
            IntentStatus::from_str("canceled").unwrap(),
            IntentStatus::Canceled
        );
        assert_eq!(
            IntentStatus::from_str("some_future_status").unwrap(),
            IntentStatus::Other
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(PaymentStatus::Pending.to_string(), "pending");
        assert_eq!(PaymentStatus::Refunded.to_string(), "refunded");
        assert_eq!(PaymentMethod::Ach.to_string(), "ach");
    }
}
