//! Payment routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::error_response};
use botica_db::PaymentRepository;
use botica_db::entities::payments;
use botica_payments::reconciler::CreatePaymentInput;
use botica_payments::ReconcileError;
use botica_shared::types::{Currency, Money, PageRequest, PageResponse};

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/payments",
            get(list_payments),
        )
        .route(
            "/tenants/{tenant_id}/payments/intent",
            post(create_payment_intent),
        )
        .route("/tenants/{tenant_id}/payments/{payment_id}", get(get_payment))
        .route(
            "/tenants/{tenant_id}/payments/{payment_id}/confirm",
            post(confirm_payment),
        )
        .route(
            "/tenants/{tenant_id}/payments/{payment_id}/refund",
            post(refund_payment),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a payment intent.
#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    /// Amount to charge.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Paying customer, when known.
    pub customer_id: Option<Uuid>,
    /// Order being paid, when known.
    pub order_id: Option<Uuid>,
}

/// Request body for confirming a payment.
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    /// The gateway intent id the client confirmed.
    pub payment_intent_id: String,
}

/// Request body for refunding a payment.
#[derive(Debug, Deserialize, Default)]
pub struct RefundRequest {
    /// Amount to refund; omitted means a full refund.
    pub amount: Option<Decimal>,
    /// Optional reason recorded at the gateway.
    pub reason: Option<String>,
}

/// Response for a payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Customer ID, if linked.
    pub customer_id: Option<Uuid>,
    /// Order ID, if linked.
    pub order_id: Option<Uuid>,
    /// Payment amount.
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Payment status.
    pub status: String,
    /// Payment method.
    pub method: String,
    /// Gateway intent id, for card payments.
    pub payment_intent_id: Option<String>,
    /// Gateway charge id once captured.
    pub charge_id: Option<String>,
    /// Gateway refund id once refunded.
    pub refund_id: Option<String>,
    /// Refunded amount.
    pub refund_amount: Option<String>,
    /// Failure reason for failed payments.
    pub failure_reason: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<payments::Model> for PaymentResponse {
    fn from(model: payments::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            order_id: model.order_id,
            amount: model.amount.to_string(),
            currency: model.currency,
            status: format!(
                "{}",
                botica_core::payment::PaymentStatus::from(model.status)
            ),
            method: format!(
                "{}",
                botica_core::payment::PaymentMethod::from(model.method)
            ),
            payment_intent_id: model.payment_intent_id,
            charge_id: model.charge_id,
            refund_id: model.refund_id,
            refund_amount: model.refund_amount.map(|a| a.to_string()),
            failure_reason: model.failure_reason,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Response for a freshly created payment intent.
#[derive(Debug, Serialize)]
pub struct CreatedPaymentResponse {
    /// The pending payment.
    pub payment: PaymentResponse,
    /// Client secret for browser-side confirmation.
    pub client_secret: Option<String>,
}

fn map_error(e: &ReconcileError) -> Response {
    error_response(e.http_status_code(), e.error_code(), e.to_string())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/tenants/{tenant_id}/payments/intent` - Create a payment intent.
async fn create_payment_intent(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<Uuid>,
    Json(request): Json<CreateIntentRequest>,
) -> Response {
    if let Err(response) = auth.ensure_tenant(tenant_id) {
        return response;
    }

    let Ok(currency) = Currency::from_str(&request.currency) else {
        return error_response(
            400,
            "UNKNOWN_CURRENCY",
            format!("Unknown currency: {}", request.currency),
        );
    };

    let input = CreatePaymentInput {
        amount: Money::new(request.amount, currency),
        customer_id: request.customer_id,
        order_id: request.order_id,
    };

    match state.reconciler.create_payment_intent(tenant_id, input).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(CreatedPaymentResponse {
                payment: PaymentResponse::from(created.payment),
                client_secret: created.client_secret,
            }),
        )
            .into_response(),
        Err(e) => map_error(&e),
    }
}

/// POST `/tenants/{tenant_id}/payments/{payment_id}/confirm` - Confirm a
/// payment against the live gateway state.
async fn confirm_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, payment_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<ConfirmRequest>,
) -> Response {
    if let Err(response) = auth.ensure_tenant(tenant_id) {
        return response;
    }

    match state
        .reconciler
        .confirm_payment(tenant_id, payment_id, &request.payment_intent_id)
        .await
    {
        Ok(payment) => Json(PaymentResponse::from(payment)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// POST `/tenants/{tenant_id}/payments/{payment_id}/refund` - Refund a
/// completed payment.
async fn refund_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, payment_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<RefundRequest>,
) -> Response {
    if let Err(response) = auth.ensure_tenant(tenant_id) {
        return response;
    }

    match state
        .reconciler
        .refund(tenant_id, payment_id, request.amount, request.reason)
        .await
    {
        Ok(payment) => Json(PaymentResponse::from(payment)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// GET `/tenants/{tenant_id}/payments/{payment_id}` - Get one payment.
async fn get_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, payment_id)): Path<(Uuid, Uuid)>,
) -> Response {
    if let Err(response) = auth.ensure_tenant(tenant_id) {
        return response;
    }

    let repo = PaymentRepository::new(state.db.clone());
    match repo.get(tenant_id, payment_id).await {
        Ok(payment) => Json(PaymentResponse::from(payment)).into_response(),
        Err(e) => error_response(e.http_status_code(), e.error_code(), e.to_string()),
    }
}

/// GET `/tenants/{tenant_id}/payments` - List payments.
async fn list_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Response {
    if let Err(response) = auth.ensure_tenant(tenant_id) {
        return response;
    }

    let repo = PaymentRepository::new(state.db.clone());
    match repo.list(tenant_id, &page).await {
        Ok((payments, total)) => {
            let data: Vec<PaymentResponse> =
                payments.into_iter().map(PaymentResponse::from).collect();
            Json(PageResponse::new(data, &page, total)).into_response()
        }
        Err(e) => error_response(e.http_status_code(), e.error_code(), e.to_string()),
    }
}
