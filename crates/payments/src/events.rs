//! Webhook event envelope and typed event data.
//!
//! Strongly-typed representations of the gateway's webhook deliveries.
//! Unknown event types fold into `EventType::Unknown`; they are accepted
//! and ignored so new gateway event types never break this system.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use botica_core::payment::IntentStatus;

/// Event types this system dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// The intent's charge was captured.
    PaymentIntentSucceeded,
    /// The intent's latest attempt failed.
    PaymentIntentFailed,
    /// Any event type this system does not handle.
    Unknown,
}

impl FromStr for EventType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentIntentFailed,
            _ => Self::Unknown,
        })
    }
}

impl EventType {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentIntentSucceeded => "payment_intent.succeeded",
            Self::PaymentIntentFailed => "payment_intent.payment_failed",
            Self::Unknown => "unknown",
        }
    }
}

/// Generic webhook event envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Unique identifier for the event (the dedup key).
    pub id: String,

    /// Type of event.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time of event creation (Unix timestamp).
    #[serde(default)]
    pub created: i64,

    /// Whether this is a live mode event.
    #[serde(default)]
    pub livemode: bool,

    /// Object containing event data.
    pub data: EventData,
}

/// Event data container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventData {
    /// The actual event object (a payment intent for the handled types).
    pub object: serde_json::Value,
}

impl WebhookEvent {
    /// Parses an event from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns the serde error message if the payload is not a valid
    /// envelope.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        serde_json::from_slice(bytes).map_err(|e| e.to_string())
    }

    /// Returns the typed event type.
    #[must_use]
    pub fn typed_event_type(&self) -> EventType {
        // Infallible error type means this can never fail
        EventType::from_str(&self.event_type).unwrap()
    }

    /// Extracts the payment intent object from the event data.
    ///
    /// # Errors
    ///
    /// Returns the serde error message if the object is not an intent.
    pub fn intent_object(&self) -> Result<IntentObject, String> {
        serde_json::from_value(self.data.object.clone()).map_err(|e| e.to_string())
    }
}

/// Payment intent object carried in intent events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentObject {
    /// Gateway intent id.
    pub id: String,
    /// Intent status at event time.
    pub status: IntentStatus,
    /// Charge id once captured.
    #[serde(default)]
    pub latest_charge: Option<String>,
    /// Metadata set when the intent was created; carries the tenant id.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Details of the last failed attempt, if any.
    #[serde(default)]
    pub last_payment_error: Option<LastPaymentError>,
}

/// Failure details on an intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastPaymentError {
    /// Human-readable failure message.
    #[serde(default)]
    pub message: Option<String>,
}

impl IntentObject {
    /// Returns the tenant id named in the intent metadata, if present and
    /// well-formed.
    #[must_use]
    pub fn tenant_id(&self) -> Option<Uuid> {
        self.metadata
            .get("tenant_id")
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }

    /// Returns the failure message of the last attempt, if any.
    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        self.last_payment_error
            .as_ref()
            .and_then(|e| e.message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_parsing() {
        assert_eq!(
            EventType::from_str("payment_intent.succeeded").unwrap(),
            EventType::PaymentIntentSucceeded
        );
        assert_eq!(
            EventType::from_str("payment_intent.payment_failed").unwrap(),
            EventType::PaymentIntentFailed
        );
        assert_eq!(
            EventType::from_str("customer.subscription.created").unwrap(),
            EventType::Unknown
        );
    }

    #[test]
    fn test_parse_succeeded_event() {
        let json = r#"{
            "id": "evt_1234567890",
            "type": "payment_intent.succeeded",
            "created": 1690000000,
            "livemode": false,
            "data": {
                "object": {
                    "id": "pi_1234567890",
                    "status": "succeeded",
                    "latest_charge": "ch_1234567890",
                    "metadata": {
                        "tenant_id": "550e8400-e29b-41d4-a716-446655440000"
                    }
                }
            }
        }"#;

        let event = WebhookEvent::from_bytes(json.as_bytes()).unwrap();
        assert_eq!(event.id, "evt_1234567890");
        assert_eq!(event.typed_event_type(), EventType::PaymentIntentSucceeded);

        let intent = event.intent_object().unwrap();
        assert_eq!(intent.id, "pi_1234567890");
        assert_eq!(intent.status, IntentStatus::Succeeded);
        assert_eq!(intent.latest_charge.as_deref(), Some("ch_1234567890"));
        assert_eq!(
            intent.tenant_id(),
            Some(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap())
        );
    }

    #[test]
    fn test_parse_failed_event_with_message() {
        let json = r#"{
            "id": "evt_failed_1",
            "type": "payment_intent.payment_failed",
            "data": {
                "object": {
                    "id": "pi_failed_1",
                    "status": "requires_payment_method",
                    "metadata": {"tenant_id": "550e8400-e29b-41d4-a716-446655440000"},
                    "last_payment_error": {"message": "Your card was declined."}
                }
            }
        }"#;

        let event = WebhookEvent::from_bytes(json.as_bytes()).unwrap();
        let intent = event.intent_object().unwrap();
        assert_eq!(intent.status, IntentStatus::RequiresPaymentMethod);
        assert_eq!(intent.failure_message(), Some("Your card was declined."));
    }

    #[test]
    fn test_missing_tenant_metadata() {
        let json = r#"{
            "id": "evt_no_tenant",
            "type": "payment_intent.succeeded",
            "data": {
                "object": {"id": "pi_x", "status": "succeeded", "metadata": {}}
            }
        }"#;

        let event = WebhookEvent::from_bytes(json.as_bytes()).unwrap();
        let intent = event.intent_object().unwrap();
        assert_eq!(intent.tenant_id(), None);
    }

    #[test]
    fn test_unknown_intent_status_folds_to_other() {
        let json = r#"{
            "id": "evt_future",
            "type": "payment_intent.succeeded",
            "data": {
                "object": {"id": "pi_y", "status": "some_future_status"}
            }
        }"#;

        let event = WebhookEvent::from_bytes(json.as_bytes()).unwrap();
        let intent = event.intent_object().unwrap();
        assert_eq!(intent.status, IntentStatus::Other);
    }

    #[test]
    fn test_malformed_payload_rejected() {
        assert!(WebhookEvent::from_bytes(b"not json").is_err());
        assert!(WebhookEvent::from_bytes(br#"{"id": "evt_1"}"#).is_err());
    }
}
