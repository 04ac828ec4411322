//! Gateway webhook routes.
//!
//! Public but signature-authenticated: the raw body must be passed to the
//! verifier untouched, so the handler extracts `Bytes` instead of a typed
//! JSON payload.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;

use crate::{AppState, routes::error_response};
use botica_payments::WebhookOutcome;

/// Header carrying the gateway signature.
const SIGNATURE_HEADER: &str = "stripe-signature";

/// Creates the webhook routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/webhooks/stripe", post(handle_stripe_webhook))
}

/// POST `/webhooks/stripe` - Handle a gateway webhook delivery.
///
/// Returns 200 for processed, already-processed, and ignored deliveries;
/// an error status makes the gateway redeliver the event.
async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        return error_response(
            400,
            "MISSING_SIGNATURE",
            format!("{SIGNATURE_HEADER} header is required"),
        );
    };

    match state.reconciler.handle_webhook_event(&body, signature).await {
        Ok(outcome) => {
            let received = match outcome {
                WebhookOutcome::Processed => "processed",
                WebhookOutcome::AlreadyProcessed => "already_processed",
                WebhookOutcome::Ignored => "ignored",
            };
            (StatusCode::OK, Json(json!({ "received": received }))).into_response()
        }
        Err(e) => error_response(e.http_status_code(), e.error_code(), e.to_string()),
    }
}
