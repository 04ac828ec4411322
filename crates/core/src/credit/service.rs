//! Credit service for limit enforcement and state rules.
//!
//! This service contains pure business logic with no database dependencies.
//! The repository layer calls into it while holding a row lock on the
//! account, so a decision made here is the decision that commits.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::CreditError;
use super::types::{AccountStatus, ChargeDecision, TransactionStatus};

/// Credit service for limit checks and transaction state validation.
pub struct CreditService;

impl CreditService {
    /// Validate the limit for a new credit account.
    ///
    /// # Errors
    ///
    /// Returns `CreditError::NegativeLimit` if the limit is below zero.
    pub fn validate_limit(limit: Decimal) -> Result<(), CreditError> {
        if limit < Decimal::ZERO {
            return Err(CreditError::NegativeLimit);
        }
        Ok(())
    }

    /// Validate a manual balance override.
    ///
    /// A balance below zero would mean the business owes the customer,
    /// which this ledger does not model.
    ///
    /// # Errors
    ///
    /// Returns `CreditError::NegativeBalance` if the balance is below zero.
    pub fn validate_balance_override(new_balance: Decimal) -> Result<(), CreditError> {
        if new_balance < Decimal::ZERO {
            return Err(CreditError::NegativeBalance);
        }
        Ok(())
    }

    /// Decide whether a charge may be applied to an account.
    ///
    /// Performs all checks in order:
    /// 1. The account status accepts charges
    /// 2. The amount is positive and the fee non-negative
    /// 3. `balance + amount` stays within the credit limit
    ///
    /// Comparisons use exact decimal arithmetic; there is no epsilon at the
    /// limit boundary. A charge that lands exactly on the limit is allowed.
    ///
    /// # Errors
    ///
    /// Returns `CreditError::LimitExceeded` with the current balance, limit,
    /// and requested amount if the charge does not fit, or the relevant
    /// validation/state error.
    pub fn check_charge(
        account_id: Uuid,
        status: AccountStatus,
        balance: Decimal,
        limit: Decimal,
        amount: Decimal,
        fee: Decimal,
    ) -> Result<ChargeDecision, CreditError> {
        match status {
            AccountStatus::Active => {}
            AccountStatus::Suspended => return Err(CreditError::AccountSuspended(account_id)),
            AccountStatus::Frozen => return Err(CreditError::AccountFrozen(account_id)),
        }

        if amount <= Decimal::ZERO {
            return Err(CreditError::NonPositiveAmount);
        }
        if fee < Decimal::ZERO {
            return Err(CreditError::NegativeFee);
        }

        let new_balance = balance + amount;
        if new_balance > limit {
            return Err(CreditError::LimitExceeded {
                balance,
                limit,
                requested: amount,
            });
        }

        Ok(ChargeDecision {
            new_balance,
            available: limit - new_balance,
        })
    }

    /// Validate a credit transaction status transition.
    ///
    /// Allowed transitions:
    /// - `pending -> paid` (settlement recorded)
    /// - `pending -> overdue` (due-date sweep)
    /// - `overdue -> paid` (late settlement)
    ///
    /// `paid` is terminal.
    ///
    /// # Errors
    ///
    /// Returns `CreditError::InvalidTransition` for any other pair.
    pub fn validate_transition(
        from: TransactionStatus,
        to: TransactionStatus,
    ) -> Result<(), CreditError> {
        use TransactionStatus::{Overdue, Paid, Pending};

        match (from, to) {
            (Pending, Paid) | (Pending, Overdue) | (Overdue, Paid) => Ok(()),
            _ => Err(CreditError::InvalidTransition { from, to }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account_id() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn test_validate_limit() {
        assert!(CreditService::validate_limit(dec!(0)).is_ok());
        assert!(CreditService::validate_limit(dec!(500.00)).is_ok());
        assert!(matches!(
            CreditService::validate_limit(dec!(-0.01)),
            Err(CreditError::NegativeLimit)
        ));
    }

    #[test]
    fn test_validate_balance_override() {
        assert!(CreditService::validate_balance_override(dec!(0)).is_ok());
        assert!(CreditService::validate_balance_override(dec!(42.10)).is_ok());
        assert!(matches!(
            CreditService::validate_balance_override(dec!(-1)),
            Err(CreditError::NegativeBalance)
        ));
    }

    #[test]
    fn test_charge_within_limit() {
        let decision = CreditService::check_charge(
            account_id(),
            AccountStatus::Active,
            dec!(0.00),
            dec!(100.00),
            dec!(85.50),
            dec!(0),
        )
        .unwrap();

        assert_eq!(decision.new_balance, dec!(85.50));
        assert_eq!(decision.available, dec!(14.50));
    }

    #[test]
    fn test_charge_exceeding_limit_reports_details() {
        let result = CreditService::check_charge(
            account_id(),
            AccountStatus::Active,
            dec!(85.50),
            dec!(100.00),
            dec!(20.00),
            dec!(0),
        );

        match result {
            Err(CreditError::LimitExceeded {
                balance,
                limit,
                requested,
            }) => {
                assert_eq!(balance, dec!(85.50));
                assert_eq!(limit, dec!(100.00));
                assert_eq!(requested, dec!(20.00));
            }
            other => panic!("expected LimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_charge_exactly_at_limit_is_allowed() {
        let decision = CreditService::check_charge(
            account_id(),
            AccountStatus::Active,
            dec!(60.00),
            dec!(100.00),
            dec!(40.00),
            dec!(0),
        )
        .unwrap();

        assert_eq!(decision.new_balance, dec!(100.00));
        assert_eq!(decision.available, dec!(0.00));
    }

    #[test]
    fn test_charge_one_cent_over_limit_is_rejected() {
        let result = CreditService::check_charge(
            account_id(),
            AccountStatus::Active,
            dec!(60.00),
            dec!(100.00),
            dec!(40.01),
            dec!(0),
        );
        assert!(matches!(result, Err(CreditError::LimitExceeded { .. })));
    }

    #[test]
    fn test_charge_zero_amount_rejected() {
        let result = CreditService::check_charge(
            account_id(),
            AccountStatus::Active,
            dec!(0),
            dec!(100),
            dec!(0),
            dec!(0),
        );
        assert!(matches!(result, Err(CreditError::NonPositiveAmount)));
    }

    #[test]
    fn test_charge_negative_amount_rejected() {
        let result = CreditService::check_charge(
            account_id(),
            AccountStatus::Active,
            dec!(0),
            dec!(100),
            dec!(-5),
            dec!(0),
        );
        assert!(matches!(result, Err(CreditError::NonPositiveAmount)));
    }

    #[test]
    fn test_charge_negative_fee_rejected() {
        let result = CreditService::check_charge(
            account_id(),
            AccountStatus::Active,
            dec!(0),
            dec!(100),
            dec!(10),
            dec!(-1),
        );
        assert!(matches!(result, Err(CreditError::NegativeFee)));
    }

    #[test]
    fn test_charge_on_suspended_account() {
        let id = account_id();
        let result = CreditService::check_charge(
            id,
            AccountStatus::Suspended,
            dec!(0),
            dec!(100),
            dec!(10),
            dec!(0),
        );
        assert!(matches!(result, Err(CreditError::AccountSuspended(got)) if got == id));
    }

    #[test]
    fn test_charge_on_frozen_account() {
        let id = account_id();
        let result = CreditService::check_charge(
            id,
            AccountStatus::Frozen,
            dec!(0),
            dec!(100),
            dec!(10),
            dec!(0),
        );
        assert!(matches!(result, Err(CreditError::AccountFrozen(got)) if got == id));
    }

    #[rstest::rstest]
    #[case(TransactionStatus::Pending, TransactionStatus::Paid, true)]
    #[case(TransactionStatus::Pending, TransactionStatus::Overdue, true)]
    #[case(TransactionStatus::Overdue, TransactionStatus::Paid, true)]
    #[case(TransactionStatus::Overdue, TransactionStatus::Overdue, false)]
    #[case(TransactionStatus::Paid, TransactionStatus::Pending, false)]
    #[case(TransactionStatus::Paid, TransactionStatus::Overdue, false)]
    #[case(TransactionStatus::Paid, TransactionStatus::Paid, false)]
    fn test_transition_table(
        #[case] from: TransactionStatus,
        #[case] to: TransactionStatus,
        #[case] allowed: bool,
    ) {
        let result = CreditService::validate_transition(from, to);
        if allowed {
            assert!(result.is_ok());
        } else {
            assert!(matches!(
                result,
                Err(CreditError::InvalidTransition { .. })
            ));
        }
    }
}
