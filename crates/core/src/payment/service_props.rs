//! Property tests for the payment state machine and fee arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::fee::application_fee;
use super::service::PaymentService;
use super::types::{IntentStatus, PaymentStatus};

fn payment_status_strategy() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![
        Just(PaymentStatus::Pending),
        Just(PaymentStatus::Completed),
        Just(PaymentStatus::Failed),
        Just(PaymentStatus::Refunded),
    ]
}

fn intent_status_strategy() -> impl Strategy<Value = IntentStatus> {
    prop_oneof![
        Just(IntentStatus::Succeeded),
        Just(IntentStatus::RequiresPaymentMethod),
        Just(IntentStatus::RequiresConfirmation),
        Just(IntentStatus::RequiresAction),
        Just(IntentStatus::Processing),
        Just(IntentStatus::Canceled),
        Just(IntentStatus::Other),
    ]
}

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The transition table is exactly the three documented pairs.
    #[test]
    fn prop_transition_table(
        from in payment_status_strategy(),
        to in payment_status_strategy(),
    ) {
        let accepted = PaymentService::validate_transition(from, to).is_ok();
        let expected = matches!(
            (from, to),
            (PaymentStatus::Pending, PaymentStatus::Completed)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Completed, PaymentStatus::Refunded)
        );
        prop_assert_eq!(accepted, expected);
    }

    /// A failed or refunded payment admits no transition at all, and the
    /// only way out of completed is a refund.
    #[test]
    fn prop_terminal_states_are_sticky(to in payment_status_strategy()) {
        prop_assert!(PaymentService::validate_transition(PaymentStatus::Failed, to).is_err());
        prop_assert!(PaymentService::validate_transition(PaymentStatus::Refunded, to).is_err());

        let from_completed = PaymentService::validate_transition(PaymentStatus::Completed, to);
        prop_assert_eq!(from_completed.is_ok(), to == PaymentStatus::Refunded);
    }

    /// Intent mapping only ever lands on completed or failed; anything in
    /// flight maps to no change.
    #[test]
    fn prop_intent_mapping_is_conservative(status in intent_status_strategy()) {
        match PaymentService::map_intent_status(status) {
            Some(PaymentStatus::Completed) => prop_assert_eq!(status, IntentStatus::Succeeded),
            Some(PaymentStatus::Failed) => prop_assert!(matches!(
                status,
                IntentStatus::RequiresPaymentMethod | IntentStatus::Canceled
            )),
            Some(other) => prop_assert!(false, "mapping produced {other}"),
            None => prop_assert!(!matches!(status, IntentStatus::Succeeded)),
        }
    }

    /// The fee is never negative and never exceeds the amount for any
    /// basis-point setting up to 100%.
    #[test]
    fn prop_fee_bounded_by_amount(
        amount in amount_strategy(),
        bps in 0u32..=10_000,
    ) {
        let fee = application_fee(amount, bps);
        prop_assert!(fee >= Decimal::ZERO);
        prop_assert!(fee <= amount);
    }

    /// The fee is monotone in the basis points.
    #[test]
    fn prop_fee_monotone_in_bps(
        amount in amount_strategy(),
        bps in 0u32..10_000,
    ) {
        let lower = application_fee(amount, bps);
        let higher = application_fee(amount, bps + 1);
        prop_assert!(lower <= higher);
    }

    /// A full refund request resolves to exactly the captured amount; any
    /// accepted partial request resolves to itself.
    #[test]
    fn prop_refund_resolution(
        captured in amount_strategy(),
        requested in proptest::option::of(amount_strategy()),
    ) {
        match PaymentService::resolve_refund_amount(requested, captured) {
            Ok(resolved) => {
                prop_assert!(resolved > Decimal::ZERO);
                prop_assert!(resolved <= captured);
                prop_assert_eq!(resolved, requested.unwrap_or(captured));
            }
            Err(_) => {
                let requested = requested.unwrap_or(captured);
                prop_assert!(requested <= Decimal::ZERO || requested > captured);
            }
        }
    }
}
