//! Domain types for credit accounts and transactions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a credit account.
///
/// Accounts are never deleted; closing one is a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Account accepts new charges.
    Active,
    /// Account temporarily rejects charges (e.g., payment dispute).
    Suspended,
    /// Account permanently rejects charges.
    Frozen,
}

impl AccountStatus {
    /// Returns true if the account accepts new charges.
    #[must_use]
    pub const fn accepts_charges(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Suspended => write!(f, "suspended"),
            Self::Frozen => write!(f, "frozen"),
        }
    }
}

/// Status of a single credit transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Charge recorded, settlement outstanding.
    Pending,
    /// Settled. Terminal: no transition out of paid.
    Paid,
    /// Past due date without settlement.
    Overdue,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Overdue => write!(f, "overdue"),
        }
    }
}

/// Outcome of a successful limit check for a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeDecision {
    /// Balance after the charge is applied.
    pub new_balance: Decimal,
    /// Credit remaining under the limit after the charge.
    pub available: Decimal,
}
