//! Payment gateway abstraction.
//!
//! The reconciler talks to the gateway exclusively through this trait, so
//! tests substitute a fake implementation and the Stripe binding stays a
//! detail of `stripe.rs`.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use botica_core::payment::IntentStatus;
use botica_shared::types::Money;

use crate::error::GatewayError;

/// Request to create a payment intent.
#[derive(Debug, Clone)]
pub struct CreateIntentRequest {
    /// Amount to charge.
    pub amount: Money,
    /// Platform fee withheld from the charge, if configured.
    pub application_fee: Option<Decimal>,
    /// Metadata attached to the intent (includes the tenant id, so
    /// webhook events can be routed back).
    pub metadata: HashMap<String, String>,
}

/// A gateway-side payment intent.
#[derive(Debug, Clone)]
pub struct Intent {
    /// Gateway intent id.
    pub id: String,
    /// Client secret for browser-side confirmation. Present on creation.
    pub client_secret: Option<String>,
    /// Current intent status.
    pub status: IntentStatus,
    /// Charge id, present once funds were captured.
    pub latest_charge: Option<String>,
    /// Human-readable failure message from the last attempt, if any.
    pub failure_message: Option<String>,
}

/// Request to refund a captured charge.
#[derive(Debug, Clone)]
pub struct CreateRefundRequest {
    /// The charge to refund.
    pub charge_id: String,
    /// Amount to refund; `None` refunds the full charge.
    pub amount: Option<Money>,
    /// Optional reason recorded at the gateway.
    pub reason: Option<String>,
}

/// A gateway-side refund.
#[derive(Debug, Clone)]
pub struct Refund {
    /// Gateway refund id.
    pub id: String,
    /// Refund status as reported by the gateway.
    pub status: String,
}

/// Capability set the reconciler needs from a payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a payment intent.
    async fn create_intent(&self, request: CreateIntentRequest) -> Result<Intent, GatewayError>;

    /// Retrieves the live state of an intent.
    async fn retrieve_intent(&self, intent_id: &str) -> Result<Intent, GatewayError>;

    /// Refunds a captured charge.
    async fn create_refund(&self, request: CreateRefundRequest) -> Result<Refund, GatewayError>;
}
