//! Webhook signature verification.
//!
//! The gateway signs each delivery with HMAC-SHA256 over
//! `"{timestamp}.{payload}"` and sends the result in a header shaped like
//! `t=<unix-ts>,v1=<hex-signature>`. Verification runs before any
//! persistence or business logic: parse the header, check the timestamp
//! against the allowed skew, recompute the MAC, and compare in constant
//! time.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Errors from webhook signature verification.
///
/// All variants mean the request is unauthenticated; the split exists for
/// logs, not for callers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// No `t=` element in the header.
    #[error("signature header is missing the timestamp")]
    MissingTimestamp,

    /// No `v1=` element in the header.
    #[error("signature header is missing the v1 signature")]
    MissingSignature,

    /// The `v1` element is not valid hex.
    #[error("signature is not valid hex")]
    MalformedSignature,

    /// Timestamp outside the allowed skew window.
    #[error("signature timestamp outside tolerance")]
    StaleTimestamp,

    /// The recomputed MAC does not match.
    #[error("signature mismatch")]
    Mismatch,
}

/// Verifies webhook signatures against the configured signing secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"[hidden]")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

impl SignatureVerifier {
    /// Creates a verifier for the given signing secret and timestamp
    /// tolerance.
    #[must_use]
    pub fn new(secret: impl Into<String>, tolerance_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs,
        }
    }

    /// Verifies a delivery against the current clock.
    ///
    /// # Errors
    ///
    /// Returns a `SignatureError` describing the first check that failed.
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<(), SignatureError> {
        self.verify_at(payload, signature_header, Utc::now().timestamp())
    }

    /// Verifies a delivery against an explicit clock, for tests.
    ///
    /// # Errors
    ///
    /// Returns a `SignatureError` describing the first check that failed.
    pub fn verify_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<(), SignatureError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signature: Option<&str> = None;

        for part in signature_header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse().ok(),
                Some(("v1", value)) => v1_signature = Some(value),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
        let v1_signature = v1_signature.ok_or(SignatureError::MissingSignature)?;

        if (now - timestamp).abs() > self.tolerance_secs {
            return Err(SignatureError::StaleTimestamp);
        }

        let signature_bytes =
            hex::decode(v1_signature).map_err(|_| SignatureError::MalformedSignature)?;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| SignatureError::Mismatch)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        // verify_slice is constant-time
        mac.verify_slice(&signature_bytes)
            .map_err(|_| SignatureError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const TOLERANCE: i64 = 300;

    /// Builds a valid signature header the way the gateway would.
    fn sign(secret: &str, payload: &[u8], timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        let signature = hex::encode(mac.finalize().into_bytes());
        format!("t={timestamp},v1={signature}")
    }

    #[test]
    fn test_valid_signature() {
        let verifier = SignatureVerifier::new(SECRET, TOLERANCE);
        let payload = br#"{"id":"evt_123","type":"payment_intent.succeeded"}"#;
        let now = 1_700_000_000;
        let header = sign(SECRET, payload, now);

        assert!(verifier.verify_at(payload, &header, now).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let verifier = SignatureVerifier::new(SECRET, TOLERANCE);
        let now = 1_700_000_000;
        let header = sign(SECRET, b"original payload", now);

        assert_eq!(
            verifier.verify_at(b"tampered payload", &header, now),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let verifier = SignatureVerifier::new(SECRET, TOLERANCE);
        let now = 1_700_000_000;
        let header = sign("whsec_other_secret", b"payload", now);

        assert_eq!(
            verifier.verify_at(b"payload", &header, now),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let verifier = SignatureVerifier::new(SECRET, TOLERANCE);
        let signed_at = 1_700_000_000;
        let header = sign(SECRET, b"payload", signed_at);

        assert_eq!(
            verifier.verify_at(b"payload", &header, signed_at + TOLERANCE + 1),
            Err(SignatureError::StaleTimestamp)
        );
    }

    #[test]
    fn test_timestamp_within_tolerance_accepted() {
        let verifier = SignatureVerifier::new(SECRET, TOLERANCE);
        let signed_at = 1_700_000_000;
        let header = sign(SECRET, b"payload", signed_at);

        assert!(verifier
            .verify_at(b"payload", &header, signed_at + TOLERANCE)
            .is_ok());
        // Skew works both ways: a timestamp slightly in the future passes too.
        assert!(verifier
            .verify_at(b"payload", &header, signed_at - 60)
            .is_ok());
    }

    #[test]
    fn test_missing_header_parts() {
        let verifier = SignatureVerifier::new(SECRET, TOLERANCE);

        assert_eq!(
            verifier.verify_at(b"payload", "v1=deadbeef", 0),
            Err(SignatureError::MissingTimestamp)
        );
        assert_eq!(
            verifier.verify_at(b"payload", "t=123", 0),
            Err(SignatureError::MissingSignature)
        );
        assert_eq!(
            verifier.verify_at(b"payload", "t=123,v1=not-hex", 123),
            Err(SignatureError::MalformedSignature)
        );
    }
}
