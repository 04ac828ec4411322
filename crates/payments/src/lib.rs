//! Payment gateway integration and reconciliation.
//!
//! This crate keeps local payment records consistent with the external
//! payment gateway:
//!
//! - **Signature Verification**: HMAC-SHA256 validation of the webhook
//!   signature header before anything else runs
//! - **Idempotency**: deduplication of webhook deliveries by event id
//!   through the `botica-db` dedup ledger
//! - **Gateway abstraction**: a [`PaymentGateway`] trait with a Stripe
//!   HTTP client implementation, injected into the reconciler so tests can
//!   substitute a fake
//! - **Reconciliation**: the [`PaymentReconciler`] orchestrating intent
//!   creation, confirmation, refunds, and webhook dispatch

pub mod error;
pub mod events;
pub mod gateway;
pub mod reconciler;
pub mod signature;
pub mod stripe;

pub use error::{GatewayError, ReconcileError};
pub use events::{EventType, IntentObject, WebhookEvent};
pub use gateway::{CreateIntentRequest, CreateRefundRequest, Intent, PaymentGateway, Refund};
pub use reconciler::{CreatePaymentInput, CreatedPayment, PaymentReconciler, WebhookOutcome};
pub use signature::SignatureVerifier;
pub use stripe::StripeGateway;
