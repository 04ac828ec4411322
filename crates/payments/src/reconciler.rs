//! Payment reconciler.
//!
//! Keeps local payment records consistent with the gateway across
//! synchronous confirmation calls and asynchronous webhook delivery.
//! Ordering rules:
//!
//! - the idempotency row is created before dispatch and marked processed
//!   only after dispatch succeeds, giving at-least-once delivery of the
//!   dispatch logic and at-most-once application of the payment mutation
//!   per event id;
//! - the live intent lookup is the source of truth over webhook payload
//!   state, and a terminal local status is never overwritten by a webhook.

use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::{info, warn};
use uuid::Uuid;

use botica_core::payment::{application_fee, PaymentService, PaymentStatus};
use botica_db::entities::payments;
use botica_db::repositories::payment::NewPayment;
use botica_db::repositories::webhook::WebhookClaim;
use botica_db::{PaymentRepository, TenantRepository, WebhookEventRepository};
use botica_shared::types::Money;
use rust_decimal::Decimal;

use crate::error::ReconcileError;
use crate::events::{EventType, IntentObject, WebhookEvent};
use crate::gateway::{CreateIntentRequest, CreateRefundRequest, PaymentGateway};
use crate::signature::SignatureVerifier;

/// Input for creating a payment intent.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// Amount to charge.
    pub amount: Money,
    /// Paying customer, when known.
    pub customer_id: Option<Uuid>,
    /// Order being paid, when known.
    pub order_id: Option<Uuid>,
}

/// A freshly created payment with its client secret.
#[derive(Debug, Clone)]
pub struct CreatedPayment {
    /// The persisted pending payment.
    pub payment: payments::Model,
    /// Client secret for browser-side confirmation.
    pub client_secret: Option<String>,
}

/// Outcome of handling a webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The event was dispatched and its effects committed.
    Processed,
    /// The event id was processed before; nothing was reapplied.
    AlreadyProcessed,
    /// The event was accepted but had no local effect (unknown type,
    /// unknown tenant, or no matching payment).
    Ignored,
}

/// Reconciles local payment state with the external gateway.
pub struct PaymentReconciler {
    payments: PaymentRepository,
    tenants: TenantRepository,
    webhooks: WebhookEventRepository,
    gateway: Arc<dyn PaymentGateway>,
    verifier: SignatureVerifier,
}

impl PaymentReconciler {
    /// Creates a reconciler over the given store and gateway.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        gateway: Arc<dyn PaymentGateway>,
        verifier: SignatureVerifier,
    ) -> Self {
        Self {
            payments: PaymentRepository::new(db.clone()),
            tenants: TenantRepository::new(db.clone()),
            webhooks: WebhookEventRepository::new(db),
            gateway,
            verifier,
        }
    }

    /// Creates a gateway intent and the matching local pending payment.
    ///
    /// The local row is inserted only after the gateway call succeeds, so
    /// a gateway failure or timeout leaves no orphaned record.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the tenant does not exist,
    /// the gateway call fails, or the insert fails.
    pub async fn create_payment_intent(
        &self,
        tenant_id: Uuid,
        input: CreatePaymentInput,
    ) -> Result<CreatedPayment, ReconcileError> {
        PaymentService::validate_amount(input.amount.amount)?;

        let tenant = self
            .tenants
            .find(tenant_id)
            .await
            .map_err(ReconcileError::Database)?
            .ok_or(ReconcileError::TenantNotFound(tenant_id))?;

        let fee_bps = self
            .tenants
            .application_fee_bps(tenant_id)
            .await
            .map_err(ReconcileError::Database)?;
        let fee = (fee_bps > 0).then(|| application_fee(input.amount.amount, fee_bps));

        let mut metadata = HashMap::new();
        metadata.insert("tenant_id".to_string(), tenant_id.to_string());
        if let Some(customer_id) = input.customer_id {
            metadata.insert("customer_id".to_string(), customer_id.to_string());
        }
        if let Some(order_id) = input.order_id {
            metadata.insert("order_id".to_string(), order_id.to_string());
        }

        let intent = self
            .gateway
            .create_intent(CreateIntentRequest {
                amount: input.amount,
                application_fee: fee,
                metadata,
            })
            .await?;

        let payment = self
            .payments
            .insert_pending(NewPayment {
                tenant_id,
                customer_id: input.customer_id,
                order_id: input.order_id,
                amount: input.amount.amount,
                currency: input.amount.currency.to_string(),
                method: botica_core::payment::PaymentMethod::Card.into(),
                payment_intent_id: Some(intent.id.clone()),
                metadata: serde_json::json!({}),
            })
            .await?;

        info!(
            tenant_id = %tenant_id,
            tenant = %tenant.slug,
            payment_id = %payment.id,
            intent_id = %intent.id,
            "Payment intent created"
        );

        Ok(CreatedPayment {
            payment,
            client_secret: intent.client_secret,
        })
    }

    /// Confirms a payment against the live gateway intent state.
    ///
    /// Idempotent: a payment already in a terminal state is returned
    /// unchanged without a gateway call, so clients may retry freely.
    ///
    /// # Errors
    ///
    /// Returns an error if the (id, tenant, intent) triple does not
    /// resolve, the gateway lookup fails, or persistence fails.
    pub async fn confirm_payment(
        &self,
        tenant_id: Uuid,
        payment_id: Uuid,
        payment_intent_id: &str,
    ) -> Result<payments::Model, ReconcileError> {
        let payment = self
            .payments
            .find_confirmable(tenant_id, payment_id, payment_intent_id)
            .await?;

        let current: PaymentStatus = payment.status.clone().into();
        if current.is_terminal() {
            info!(
                tenant_id = %tenant_id,
                payment_id = %payment_id,
                status = %current,
                "Confirmation retried on terminal payment, returning unchanged"
            );
            return Ok(payment);
        }

        let intent = self.gateway.retrieve_intent(payment_intent_id).await?;

        match PaymentService::map_intent_status(intent.status) {
            Some(PaymentStatus::Completed) => {
                self.complete(tenant_id, payment_id, intent.latest_charge.as_deref())
                    .await
            }
            Some(PaymentStatus::Failed) => {
                let reason = intent
                    .failure_message
                    .as_deref()
                    .unwrap_or("payment attempt failed");
                self.fail(tenant_id, payment_id, reason).await
            }
            // Intent still in flight; the local payment stays pending.
            _ => Ok(payment),
        }
    }

    /// Refunds a completed payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment is not refundable, the gateway
    /// refund fails, or persistence fails.
    pub async fn refund(
        &self,
        tenant_id: Uuid,
        payment_id: Uuid,
        amount: Option<Decimal>,
        reason: Option<String>,
    ) -> Result<payments::Model, ReconcileError> {
        let payment = self.payments.get(tenant_id, payment_id).await?;

        let status: PaymentStatus = payment.status.clone().into();
        PaymentService::validate_refund(status, payment.charge_id.as_deref())?;
        let refund_amount = PaymentService::resolve_refund_amount(amount, payment.amount)?;

        let charge_id = payment
            .charge_id
            .clone()
            .unwrap_or_default();
        let currency = payment
            .currency
            .parse()
            .map_err(|e: String| ReconcileError::InvalidPayload(e))?;

        let refund = self
            .gateway
            .create_refund(CreateRefundRequest {
                charge_id,
                // Full refunds omit the amount so the gateway refunds
                // whatever it captured.
                amount: (amount.is_some()).then_some(Money::new(refund_amount, currency)),
                reason: reason.clone(),
            })
            .await?;

        let mut metadata = payment.metadata.clone();
        if let Some(reason) = reason {
            if let Some(object) = metadata.as_object_mut() {
                object.insert("refund_reason".to_string(), reason.into());
            }
        }

        match self
            .payments
            .mark_refunded(tenant_id, payment_id, &refund.id, refund_amount, metadata)
            .await?
        {
            Some(updated) => Ok(updated),
            // Lost the race against a concurrent transition; report the
            // state that won.
            None => {
                let current = self.payments.get(tenant_id, payment_id).await?;
                let status: PaymentStatus = current.status.clone().into();
                if status == PaymentStatus::Refunded {
                    Ok(current)
                } else {
                    Err(botica_core::payment::PaymentError::InvalidState {
                        current: status,
                        expected: PaymentStatus::Completed,
                    }
                    .into())
                }
            }
        }
    }

    /// Handles an inbound webhook delivery.
    ///
    /// Signature verification runs before any persistence or business
    /// logic. Duplicate event ids short-circuit without side effects. A
    /// dispatch failure propagates so the gateway redelivers.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::InvalidSignature` on verification failure,
    /// `ReconcileError::InvalidPayload` on a malformed envelope, or the
    /// dispatch error that should trigger redelivery.
    pub async fn handle_webhook_event(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookOutcome, ReconcileError> {
        self.verifier
            .verify(payload, signature_header)
            .map_err(|e| {
                warn!(error = %e, "Webhook rejected: signature verification failed");
                ReconcileError::InvalidSignature
            })?;

        let event = WebhookEvent::from_bytes(payload).map_err(ReconcileError::InvalidPayload)?;

        match self
            .webhooks
            .claim(&event.id, &event.event_type)
            .await
            .map_err(ReconcileError::Database)?
        {
            WebhookClaim::AlreadyProcessed(_) => return Ok(WebhookOutcome::AlreadyProcessed),
            WebhookClaim::Fresh(_) | WebhookClaim::Retry(_) => {}
        }

        let outcome = match self.dispatch(&event).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // processed stays false so the gateway's retry redelivers
                if let Err(record_err) = self
                    .webhooks
                    .record_failure(&event.id, &e.to_string())
                    .await
                {
                    warn!(
                        event_id = %event.id,
                        error = %record_err,
                        "Failed to record webhook dispatch failure"
                    );
                }
                return Err(e);
            }
        };

        self.webhooks
            .mark_processed(&event.id)
            .await
            .map_err(ReconcileError::Database)?;

        Ok(outcome)
    }

    /// Dispatches a verified, claimed event.
    async fn dispatch(&self, event: &WebhookEvent) -> Result<WebhookOutcome, ReconcileError> {
        match event.typed_event_type() {
            EventType::PaymentIntentSucceeded => {
                self.apply_intent_event(event, PaymentStatus::Completed).await
            }
            EventType::PaymentIntentFailed => {
                self.apply_intent_event(event, PaymentStatus::Failed).await
            }
            EventType::Unknown => {
                info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "Ignoring unhandled webhook event type"
                );
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    /// Applies a payment-intent event to the matching local payment.
    ///
    /// A missing tenant id or missing local payment is a logged no-op: the
    /// event may refer to a payment created before this system tracked it.
    async fn apply_intent_event(
        &self,
        event: &WebhookEvent,
        target: PaymentStatus,
    ) -> Result<WebhookOutcome, ReconcileError> {
        let intent: IntentObject = event
            .intent_object()
            .map_err(ReconcileError::InvalidPayload)?;

        let Some(tenant_id) = intent.tenant_id() else {
            info!(
                event_id = %event.id,
                intent_id = %intent.id,
                "Webhook event names no known tenant, ignoring"
            );
            return Ok(WebhookOutcome::Ignored);
        };

        let Some(payment) = self.payments.find_by_intent(tenant_id, &intent.id).await? else {
            info!(
                event_id = %event.id,
                tenant_id = %tenant_id,
                intent_id = %intent.id,
                "No local payment for intent, ignoring"
            );
            return Ok(WebhookOutcome::Ignored);
        };

        let current: PaymentStatus = payment.status.clone().into();
        if current.is_terminal() {
            // Webhooks arrive in no particular order; a terminal status
            // decided from the live intent lookup outranks a late event.
            info!(
                event_id = %event.id,
                payment_id = %payment.id,
                status = %current,
                "Payment already terminal, webhook has no effect"
            );
            return Ok(WebhookOutcome::Ignored);
        }

        let updated = match target {
            PaymentStatus::Completed => {
                self.payments
                    .complete_from_pending(tenant_id, payment.id, intent.latest_charge.as_deref())
                    .await?
            }
            PaymentStatus::Failed => {
                let reason = intent
                    .failure_message()
                    .unwrap_or("payment attempt failed");
                self.payments
                    .fail_from_pending(tenant_id, payment.id, reason)
                    .await?
            }
            _ => None,
        };

        if updated.is_none() {
            // Another transition won between our read and the guarded
            // update. That transition already recorded the outcome.
            info!(
                event_id = %event.id,
                payment_id = %payment.id,
                "Payment transitioned concurrently, webhook has no effect"
            );
            return Ok(WebhookOutcome::Ignored);
        }

        Ok(WebhookOutcome::Processed)
    }

    async fn complete(
        &self,
        tenant_id: Uuid,
        payment_id: Uuid,
        charge_id: Option<&str>,
    ) -> Result<payments::Model, ReconcileError> {
        match self
            .payments
            .complete_from_pending(tenant_id, payment_id, charge_id)
            .await?
        {
            Some(updated) => Ok(updated),
            None => Ok(self.payments.get(tenant_id, payment_id).await?),
        }
    }

    async fn fail(
        &self,
        tenant_id: Uuid,
        payment_id: Uuid,
        reason: &str,
    ) -> Result<payments::Model, ReconcileError> {
        match self
            .payments
            .fail_from_pending(tenant_id, payment_id, reason)
            .await?
        {
            Some(updated) => Ok(updated),
            None => Ok(self.payments.get(tenant_id, payment_id).await?),
        }
    }
}
