//! Database enum types mirrored as Rust enums.
//!
//! Conversions to and from the pure domain enums in `botica-core` live
//! here so repositories can hand domain values to the business logic.

use botica_core::credit::{AccountStatus, TransactionStatus};
use botica_core::payment::{PaymentMethod as DomainPaymentMethod, PaymentStatus as DomainPaymentStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a credit account.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "credit_account_status")]
#[serde(rename_all = "snake_case")]
pub enum CreditAccountStatus {
    /// Account accepts new charges.
    #[sea_orm(string_value = "active")]
    Active,
    /// Account temporarily rejects charges.
    #[sea_orm(string_value = "suspended")]
    Suspended,
    /// Account permanently rejects charges.
    #[sea_orm(string_value = "frozen")]
    Frozen,
}

impl From<CreditAccountStatus> for AccountStatus {
    fn from(status: CreditAccountStatus) -> Self {
        match status {
            CreditAccountStatus::Active => Self::Active,
            CreditAccountStatus::Suspended => Self::Suspended,
            CreditAccountStatus::Frozen => Self::Frozen,
        }
    }
}

impl From<AccountStatus> for CreditAccountStatus {
    fn from(status: AccountStatus) -> Self {
        match status {
            AccountStatus::Active => Self::Active,
            AccountStatus::Suspended => Self::Suspended,
            AccountStatus::Frozen => Self::Frozen,
        }
    }
}

/// Status of a credit transaction.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "credit_transaction_status"
)]
#[serde(rename_all = "snake_case")]
pub enum CreditTransactionStatus {
    /// Charge recorded, settlement outstanding.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Settled.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Past due date without settlement.
    #[sea_orm(string_value = "overdue")]
    Overdue,
}

impl From<CreditTransactionStatus> for TransactionStatus {
    fn from(status: CreditTransactionStatus) -> Self {
        match status {
            CreditTransactionStatus::Pending => Self::Pending,
            CreditTransactionStatus::Paid => Self::Paid,
            CreditTransactionStatus::Overdue => Self::Overdue,
        }
    }
}

impl From<TransactionStatus> for CreditTransactionStatus {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Pending => Self::Pending,
            TransactionStatus::Paid => Self::Paid,
            TransactionStatus::Overdue => Self::Overdue,
        }
    }
}

/// Status of a payment record.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Attempt created, outcome unknown.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Funds captured.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Attempt failed or was canceled.
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Completed payment was refunded.
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl From<PaymentStatus> for DomainPaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Completed => Self::Completed,
            PaymentStatus::Failed => Self::Failed,
            PaymentStatus::Refunded => Self::Refunded,
        }
    }
}

impl From<DomainPaymentStatus> for PaymentStatus {
    fn from(status: DomainPaymentStatus) -> Self {
        match status {
            DomainPaymentStatus::Pending => Self::Pending,
            DomainPaymentStatus::Completed => Self::Completed,
            DomainPaymentStatus::Failed => Self::Failed,
            DomainPaymentStatus::Refunded => Self::Refunded,
        }
    }
}

/// How a payment was made.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payment through the gateway.
    #[sea_orm(string_value = "card")]
    Card,
    /// Cash at the counter.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Bank transfer.
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// ACH debit.
    #[sea_orm(string_value = "ach")]
    Ach,
    /// Tenant-defined method.
    #[sea_orm(string_value = "custom")]
    Custom,
}

impl From<PaymentMethod> for DomainPaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Card => Self::Card,
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::Transfer => Self::Transfer,
            PaymentMethod::Ach => Self::Ach,
            PaymentMethod::Custom => Self::Custom,
        }
    }
}

impl From<DomainPaymentMethod> for PaymentMethod {
    fn from(method: DomainPaymentMethod) -> Self {
        match method {
            DomainPaymentMethod::Card => Self::Card,
            DomainPaymentMethod::Cash => Self::Cash,
            DomainPaymentMethod::Transfer => Self::Transfer,
            DomainPaymentMethod::Ach => Self::Ach,
            DomainPaymentMethod::Custom => Self::Custom,
        }
    }
}
