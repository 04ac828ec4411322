//! Stripe HTTP binding for the [`PaymentGateway`] trait.
//!
//! A thin client over Stripe's form-encoded REST API. Every request is
//! bounded by the configured timeout; a timeout surfaces as
//! `GatewayError::Timeout` and leaves no local state behind (the
//! reconciler only persists after a successful gateway call).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use botica_core::payment::IntentStatus;
use botica_shared::config::GatewayConfig;
use botica_shared::types::Money;

use crate::error::GatewayError;
use crate::gateway::{CreateIntentRequest, CreateRefundRequest, Intent, PaymentGateway, Refund};

/// Stripe client implementing the gateway capability set.
#[derive(Clone)]
pub struct StripeGateway {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl std::fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeGateway")
            .field("base_url", &self.base_url)
            .field("secret_key", &"[hidden]")
            .finish()
    }
}

impl StripeGateway {
    /// Creates a Stripe client from the gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(GatewayError::from)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request.bearer_auth(&self.secret_key).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| GatewayError::UnexpectedResponse(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, request: CreateIntentRequest) -> Result<Intent, GatewayError> {
        let form = intent_form(&request)?;
        debug!(amount = %request.amount.amount, currency = %request.amount.currency, "Creating payment intent");

        let response: IntentResponse = self
            .execute(
                self.http
                    .post(format!("{}/v1/payment_intents", self.base_url))
                    .form(&form),
            )
            .await?;

        Ok(response.into())
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<Intent, GatewayError> {
        let response: IntentResponse = self
            .execute(
                self.http
                    .get(format!("{}/v1/payment_intents/{intent_id}", self.base_url)),
            )
            .await?;

        Ok(response.into())
    }

    async fn create_refund(&self, request: CreateRefundRequest) -> Result<Refund, GatewayError> {
        let form = refund_form(&request)?;
        debug!(charge_id = %request.charge_id, "Creating refund");

        let response: RefundResponse = self
            .execute(
                self.http
                    .post(format!("{}/v1/refunds", self.base_url))
                    .form(&form),
            )
            .await?;

        Ok(Refund {
            id: response.id,
            status: response.status,
        })
    }
}

/// Builds the form body for intent creation.
fn intent_form(request: &CreateIntentRequest) -> Result<Vec<(String, String)>, GatewayError> {
    let minor = minor_units(request.amount)?;

    let mut form = vec![
        ("amount".to_string(), minor.to_string()),
        (
            "currency".to_string(),
            request.amount.currency.gateway_code().to_string(),
        ),
        (
            "automatic_payment_methods[enabled]".to_string(),
            "true".to_string(),
        ),
    ];

    if let Some(fee) = request.application_fee {
        let fee_minor = minor_units(Money::new(fee, request.amount.currency))?;
        if fee_minor > 0 {
            form.push(("application_fee_amount".to_string(), fee_minor.to_string()));
        }
    }

    for (key, value) in &request.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }

    Ok(form)
}

/// Builds the form body for a refund.
fn refund_form(request: &CreateRefundRequest) -> Result<Vec<(String, String)>, GatewayError> {
    let mut form = vec![("charge".to_string(), request.charge_id.clone())];

    if let Some(amount) = request.amount {
        form.push(("amount".to_string(), minor_units(amount)?.to_string()));
    }
    if let Some(reason) = &request.reason {
        form.push(("reason".to_string(), reason.clone()));
    }

    Ok(form)
}

fn minor_units(money: Money) -> Result<i64, GatewayError> {
    match money.minor_units() {
        Some(minor) if minor > 0 => Ok(minor),
        _ => Err(GatewayError::InvalidAmount),
    }
}

// ============================================================
// Wire types
// ============================================================

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    status: IntentStatus,
    #[serde(default)]
    client_secret: Option<String>,
    #[serde(default)]
    latest_charge: Option<String>,
    #[serde(default)]
    last_payment_error: Option<LastPaymentError>,
}

#[derive(Debug, Deserialize)]
struct LastPaymentError {
    #[serde(default)]
    message: Option<String>,
}

impl From<IntentResponse> for Intent {
    fn from(response: IntentResponse) -> Self {
        Self {
            id: response.id,
            client_secret: response.client_secret,
            status: response.status,
            latest_charge: response.latest_charge,
            failure_message: response.last_payment_error.and_then(|e| e.message),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefundResponse {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use botica_shared::types::Currency;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[test]
    fn test_intent_form_basic() {
        let request = CreateIntentRequest {
            amount: Money::new(dec!(50.00), Currency::Usd),
            application_fee: None,
            metadata: HashMap::new(),
        };

        let form = intent_form(&request).unwrap();
        assert!(form.contains(&("amount".to_string(), "5000".to_string())));
        assert!(form.contains(&("currency".to_string(), "usd".to_string())));
        assert!(!form.iter().any(|(k, _)| k == "application_fee_amount"));
    }

    #[test]
    fn test_intent_form_with_fee_and_metadata() {
        let mut metadata = HashMap::new();
        metadata.insert("tenant_id".to_string(), "t-1".to_string());

        let request = CreateIntentRequest {
            amount: Money::new(dec!(100.00), Currency::Eur),
            application_fee: Some(dec!(2.50)),
            metadata,
        };

        let form = intent_form(&request).unwrap();
        assert!(form.contains(&("amount".to_string(), "10000".to_string())));
        assert!(form.contains(&("currency".to_string(), "eur".to_string())));
        assert!(form.contains(&("application_fee_amount".to_string(), "250".to_string())));
        assert!(form.contains(&("metadata[tenant_id]".to_string(), "t-1".to_string())));
    }

    #[test]
    fn test_intent_form_rejects_zero_amount() {
        let request = CreateIntentRequest {
            amount: Money::new(dec!(0), Currency::Usd),
            application_fee: None,
            metadata: HashMap::new(),
        };

        assert!(matches!(
            intent_form(&request),
            Err(GatewayError::InvalidAmount)
        ));
    }

    #[test]
    fn test_refund_form() {
        let request = CreateRefundRequest {
            charge_id: "ch_123".to_string(),
            amount: Some(Money::new(dec!(20.00), Currency::Usd)),
            reason: Some("requested_by_customer".to_string()),
        };

        let form = refund_form(&request).unwrap();
        assert!(form.contains(&("charge".to_string(), "ch_123".to_string())));
        assert!(form.contains(&("amount".to_string(), "2000".to_string())));
        assert!(form.contains(&(
            "reason".to_string(),
            "requested_by_customer".to_string()
        )));
    }

    #[test]
    fn test_full_refund_omits_amount() {
        let request = CreateRefundRequest {
            charge_id: "ch_123".to_string(),
            amount: None,
            reason: None,
        };

        let form = refund_form(&request).unwrap();
        assert_eq!(form, vec![("charge".to_string(), "ch_123".to_string())]);
    }

    #[test]
    fn test_parse_intent_response() {
        let json = r#"{
            "id": "pi_123",
            "status": "succeeded",
            "client_secret": "pi_123_secret_abc",
            "latest_charge": "ch_456",
            "object": "payment_intent"
        }"#;

        let response: IntentResponse = serde_json::from_str(json).unwrap();
        let intent: Intent = response.into();

        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.status, IntentStatus::Succeeded);
        assert_eq!(intent.client_secret.as_deref(), Some("pi_123_secret_abc"));
        assert_eq!(intent.latest_charge.as_deref(), Some("ch_456"));
        assert_eq!(intent.failure_message, None);
    }

    #[test]
    fn test_parse_failed_intent_response() {
        let json = r#"{
            "id": "pi_124",
            "status": "requires_payment_method",
            "last_payment_error": {"message": "Your card was declined.", "code": "card_declined"}
        }"#;

        let response: IntentResponse = serde_json::from_str(json).unwrap();
        let intent: Intent = response.into();

        assert_eq!(intent.status, IntentStatus::RequiresPaymentMethod);
        assert_eq!(
            intent.failure_message.as_deref(),
            Some("Your card was declined.")
        );
    }

    #[test]
    fn test_parse_error_envelope() {
        let json = r#"{"error": {"message": "No such payment_intent", "type": "invalid_request_error"}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(
            envelope.error.message.as_deref(),
            Some("No such payment_intent")
        );
    }
}
