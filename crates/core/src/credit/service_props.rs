//! Property tests for credit limit enforcement.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::CreditError;
use super::service::CreditService;
use super::types::{AccountStatus, TransactionStatus};

/// Strategy for generating positive decimal amounts with 2 decimal places.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating non-negative limits with 2 decimal places.
fn limit_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn status_strategy() -> impl Strategy<Value = TransactionStatus> {
    prop_oneof![
        Just(TransactionStatus::Pending),
        Just(TransactionStatus::Paid),
        Just(TransactionStatus::Overdue),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any sequence of charges, the running balance never exceeds the
    /// limit after an accepted charge, and a rejected charge leaves the
    /// balance untouched.
    #[test]
    fn prop_balance_never_exceeds_limit(
        limit in limit_strategy(),
        amounts in prop::collection::vec(amount_strategy(), 1..50),
    ) {
        let account = Uuid::new_v4();
        let mut balance = Decimal::ZERO;

        for amount in amounts {
            let before = balance;
            match CreditService::check_charge(
                account,
                AccountStatus::Active,
                balance,
                limit,
                amount,
                Decimal::ZERO,
            ) {
                Ok(decision) => {
                    balance = decision.new_balance;
                    prop_assert!(balance <= limit, "accepted charge overshot the limit");
                    prop_assert_eq!(decision.available, limit - balance);
                }
                Err(CreditError::LimitExceeded { balance: reported, limit: l, requested }) => {
                    prop_assert_eq!(reported, before, "rejection must report the untouched balance");
                    prop_assert_eq!(l, limit);
                    prop_assert_eq!(requested, amount);
                    prop_assert!(before + amount > limit, "rejection only when the charge does not fit");
                }
                Err(e) => prop_assert!(false, "unexpected error: {e}"),
            }
        }
    }

    /// An accepted charge moves the balance by exactly the charge amount.
    #[test]
    fn prop_accepted_charge_is_exact(
        balance in limit_strategy(),
        amount in amount_strategy(),
    ) {
        let limit = balance + amount; // always fits exactly
        let decision = CreditService::check_charge(
            Uuid::new_v4(),
            AccountStatus::Active,
            balance,
            limit,
            amount,
            Decimal::ZERO,
        ).unwrap();

        prop_assert_eq!(decision.new_balance, balance + amount);
        prop_assert_eq!(decision.available, Decimal::ZERO);
    }

    /// Suspended and frozen accounts reject every charge, regardless of room.
    #[test]
    fn prop_closed_accounts_reject_charges(
        limit in limit_strategy(),
        amount in amount_strategy(),
    ) {
        let account = Uuid::new_v4();

        let suspended = CreditService::check_charge(
            account, AccountStatus::Suspended, Decimal::ZERO, limit, amount, Decimal::ZERO,
        );
        prop_assert!(matches!(suspended, Err(CreditError::AccountSuspended(_))));

        let frozen = CreditService::check_charge(
            account, AccountStatus::Frozen, Decimal::ZERO, limit, amount, Decimal::ZERO,
        );
        prop_assert!(matches!(frozen, Err(CreditError::AccountFrozen(_))));
    }

    /// `paid` is terminal: no transition out of it is ever accepted.
    #[test]
    fn prop_paid_is_terminal(to in status_strategy()) {
        let result = CreditService::validate_transition(TransactionStatus::Paid, to);
        prop_assert!(result.is_err());
    }

    /// Every accepted transition ends in `paid` or `overdue` and starts
    /// from a non-terminal status.
    #[test]
    fn prop_transition_table(from in status_strategy(), to in status_strategy()) {
        let accepted = CreditService::validate_transition(from, to).is_ok();
        let expected = matches!(
            (from, to),
            (TransactionStatus::Pending, TransactionStatus::Paid)
                | (TransactionStatus::Pending, TransactionStatus::Overdue)
                | (TransactionStatus::Overdue, TransactionStatus::Paid)
        );
        prop_assert_eq!(accepted, expected);
    }
}
