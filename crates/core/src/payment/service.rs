//! Payment service for state transitions and gateway status mapping.
//!
//! This service contains pure business logic with no gateway or database
//! dependencies. The reconciler calls into it before persisting anything,
//! so every transition that commits has been validated here.

use rust_decimal::Decimal;

use super::error::PaymentError;
use super::types::{IntentStatus, PaymentStatus};

/// Payment service for status mapping and transition validation.
pub struct PaymentService;

impl PaymentService {
    /// Validate the amount for a new payment intent.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NonPositiveAmount` if the amount is zero or
    /// negative.
    pub fn validate_amount(amount: Decimal) -> Result<(), PaymentError> {
        if amount <= Decimal::ZERO {
            return Err(PaymentError::NonPositiveAmount);
        }
        Ok(())
    }

    /// Map a gateway intent status to the local payment status it implies.
    ///
    /// Returns `None` when the intent is still in flight and the local
    /// payment should remain `pending`.
    #[must_use]
    pub const fn map_intent_status(status: IntentStatus) -> Option<PaymentStatus> {
        match status {
            IntentStatus::Succeeded => Some(PaymentStatus::Completed),
            IntentStatus::RequiresPaymentMethod | IntentStatus::Canceled => {
                Some(PaymentStatus::Failed)
            }
            IntentStatus::RequiresConfirmation
            | IntentStatus::RequiresAction
            | IntentStatus::Processing
            | IntentStatus::Other => None,
        }
    }

    /// Validate a payment status transition.
    ///
    /// Allowed transitions:
    /// - `pending -> completed` / `pending -> failed` (gateway outcome)
    /// - `completed -> refunded` (explicit refund)
    ///
    /// Every terminal state reached once stays reached; a late gateway
    /// signal can never overwrite `completed`, `failed`, or `refunded`
    /// with anything else.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidTransition` for any other pair.
    pub fn validate_transition(
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<(), PaymentError> {
        use PaymentStatus::{Completed, Failed, Pending, Refunded};

        match (from, to) {
            (Pending, Completed) | (Pending, Failed) | (Completed, Refunded) => Ok(()),
            _ => Err(PaymentError::InvalidTransition { from, to }),
        }
    }

    /// Validate that a payment is refundable.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidState` if the payment is not
    /// `completed`, or `PaymentError::MissingCharge` if no gateway charge
    /// id is on record to refund against.
    pub fn validate_refund(
        status: PaymentStatus,
        charge_id: Option<&str>,
    ) -> Result<(), PaymentError> {
        if status != PaymentStatus::Completed {
            return Err(PaymentError::InvalidState {
                current: status,
                expected: PaymentStatus::Completed,
            });
        }
        if charge_id.is_none_or(str::is_empty) {
            return Err(PaymentError::MissingCharge);
        }
        Ok(())
    }

    /// Resolve and validate the refund amount.
    ///
    /// An unspecified amount means a full refund of the captured amount.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NonPositiveAmount` for a zero/negative
    /// request, or `PaymentError::RefundExceedsAmount` when the request is
    /// larger than what was captured.
    pub fn resolve_refund_amount(
        requested: Option<Decimal>,
        captured: Decimal,
    ) -> Result<Decimal, PaymentError> {
        let amount = requested.unwrap_or(captured);
        if amount <= Decimal::ZERO {
            return Err(PaymentError::NonPositiveAmount);
        }
        if amount > captured {
            return Err(PaymentError::RefundExceedsAmount {
                requested: amount,
                captured,
            });
        }
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_amount() {
        assert!(PaymentService::validate_amount(dec!(0.01)).is_ok());
        assert!(PaymentService::validate_amount(dec!(50.00)).is_ok());
        assert!(matches!(
            PaymentService::validate_amount(dec!(0)),
            Err(PaymentError::NonPositiveAmount)
        ));
        assert!(matches!(
            PaymentService::validate_amount(dec!(-10)),
            Err(PaymentError::NonPositiveAmount)
        ));
    }

    #[test]
    fn test_map_succeeded_to_completed() {
        assert_eq!(
            PaymentService::map_intent_status(IntentStatus::Succeeded),
            Some(PaymentStatus::Completed)
        );
    }

    #[test]
    fn test_map_failures() {
        assert_eq!(
            PaymentService::map_intent_status(IntentStatus::RequiresPaymentMethod),
            Some(PaymentStatus::Failed)
        );
        assert_eq!(
            PaymentService::map_intent_status(IntentStatus::Canceled),
            Some(PaymentStatus::Failed)
        );
    }

    #[test]
    fn test_map_in_flight_statuses_stay_pending() {
        for status in [
            IntentStatus::RequiresConfirmation,
            IntentStatus::RequiresAction,
            IntentStatus::Processing,
            IntentStatus::Other,
        ] {
            assert_eq!(PaymentService::map_intent_status(status), None);
        }
    }

    #[rstest::rstest]
    #[case(PaymentStatus::Pending, PaymentStatus::Completed, true)]
    #[case(PaymentStatus::Pending, PaymentStatus::Failed, true)]
    #[case(PaymentStatus::Completed, PaymentStatus::Refunded, true)]
    #[case(PaymentStatus::Pending, PaymentStatus::Refunded, false)]
    #[case(PaymentStatus::Completed, PaymentStatus::Failed, false)]
    #[case(PaymentStatus::Failed, PaymentStatus::Completed, false)]
    #[case(PaymentStatus::Refunded, PaymentStatus::Completed, false)]
    #[case(PaymentStatus::Refunded, PaymentStatus::Pending, false)]
    fn test_transition_table(
        #[case] from: PaymentStatus,
        #[case] to: PaymentStatus,
        #[case] allowed: bool,
    ) {
        let result = PaymentService::validate_transition(from, to);
        if allowed {
            assert!(result.is_ok());
        } else {
            assert!(matches!(
                result,
                Err(PaymentError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn test_refund_requires_completed() {
        let result = PaymentService::validate_refund(PaymentStatus::Pending, Some("ch_123"));
        match result {
            Err(PaymentError::InvalidState { current, expected }) => {
                assert_eq!(current, PaymentStatus::Pending);
                assert_eq!(expected, PaymentStatus::Completed);
            }
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[test]
    fn test_refund_requires_charge_id() {
        assert!(matches!(
            PaymentService::validate_refund(PaymentStatus::Completed, None),
            Err(PaymentError::MissingCharge)
        ));
        assert!(matches!(
            PaymentService::validate_refund(PaymentStatus::Completed, Some("")),
            Err(PaymentError::MissingCharge)
        ));
        assert!(PaymentService::validate_refund(PaymentStatus::Completed, Some("ch_123")).is_ok());
    }

    #[test]
    fn test_resolve_refund_amount_defaults_to_full() {
        assert_eq!(
            PaymentService::resolve_refund_amount(None, dec!(50.00)).unwrap(),
            dec!(50.00)
        );
    }

    #[test]
    fn test_resolve_partial_refund() {
        assert_eq!(
            PaymentService::resolve_refund_amount(Some(dec!(20.00)), dec!(50.00)).unwrap(),
            dec!(20.00)
        );
    }

    #[test]
    fn test_refund_cannot_exceed_captured() {
        let result = PaymentService::resolve_refund_amount(Some(dec!(60.00)), dec!(50.00));
        assert!(matches!(
            result,
            Err(PaymentError::RefundExceedsAmount { .. })
        ));
    }
}
