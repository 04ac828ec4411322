//! Payment business logic.
//!
//! This module implements the rules that keep a local payment record
//! consistent with the external gateway:
//! - Payment status state machine (terminal states, refund eligibility)
//! - Mapping of gateway intent statuses to local payment statuses
//! - Application fee arithmetic
//! - Error types for payment operations

pub mod error;
pub mod fee;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PaymentError;
pub use fee::application_fee;
pub use service::PaymentService;
pub use types::{IntentStatus, PaymentMethod, PaymentStatus};
