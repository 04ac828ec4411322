//! Credit account business logic.
//!
//! This module implements the rules for customer credit accounts:
//! - Limit enforcement for charges against an account
//! - Account status gating (suspended/frozen accounts reject charges)
//! - Credit transaction state rules
//! - Error types for credit operations
//!
//! The balance sign convention is: a positive balance is the amount of
//! credit the customer has consumed and owes the business. An active
//! account always satisfies `balance <= credit_limit`.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::CreditError;
pub use service::CreditService;
pub use types::{AccountStatus, ChargeDecision, TransactionStatus};
