//! Error types for gateway calls and reconciliation.

use thiserror::Error;
use uuid::Uuid;

use botica_core::payment::PaymentError;
use botica_db::repositories::payment::PaymentRepoError;

/// Errors from the external payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway request timed out.
    #[error("Gateway request timed out")]
    Timeout,

    /// Transport-level failure talking to the gateway.
    #[error("Gateway request failed: {0}")]
    Http(String),

    /// The gateway rejected the request.
    #[error("Gateway returned {status}: {message}")]
    Api {
        /// HTTP status the gateway returned.
        status: u16,
        /// Error message from the gateway, when present.
        message: String,
    },

    /// The gateway response did not have the expected shape.
    #[error("Unexpected gateway response: {0}")]
    UnexpectedResponse(String),

    /// The amount cannot be represented in the gateway's minor units.
    #[error("Amount cannot be represented in minor units")]
    InvalidAmount,
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e.to_string())
        }
    }
}

/// Errors that can occur during payment reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Tenant does not exist.
    #[error("Tenant not found: {0}")]
    TenantNotFound(Uuid),

    /// Business rule violation from the payment service.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Payment record error from the repository.
    #[error(transparent)]
    Repo(#[from] PaymentRepoError),

    /// External gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Webhook signature verification failed.
    #[error("Webhook signature verification failed")]
    InvalidSignature,

    /// Webhook payload could not be parsed.
    #[error("Malformed webhook payload: {0}")]
    InvalidPayload(String),

    /// Database error outside a repository call.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl ReconcileError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TenantNotFound(_) => "TENANT_NOT_FOUND",
            Self::Payment(e) => e.error_code(),
            Self::Repo(e) => e.error_code(),
            Self::Gateway(_) => "GATEWAY_ERROR",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::TenantNotFound(_) => 404,
            Self::Payment(e) => e.http_status_code(),
            Self::Repo(e) => e.http_status_code(),
            Self::Gateway(_) => 502,
            Self::InvalidSignature => 401,
            Self::InvalidPayload(_) => 400,
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ReconcileError::InvalidSignature.http_status_code(), 401);
        assert_eq!(
            ReconcileError::Gateway(GatewayError::Timeout).http_status_code(),
            502
        );
        assert_eq!(
            ReconcileError::InvalidPayload("bad json".into()).http_status_code(),
            400
        );
        assert_eq!(
            ReconcileError::TenantNotFound(Uuid::nil()).http_status_code(),
            404
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ReconcileError::InvalidSignature.error_code(),
            "INVALID_SIGNATURE"
        );
        assert_eq!(
            ReconcileError::Gateway(GatewayError::InvalidAmount).error_code(),
            "GATEWAY_ERROR"
        );
    }

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Api {
            status: 402,
            message: "Your card was declined.".into(),
        };
        assert_eq!(err.to_string(), "Gateway returned 402: Your card was declined.");
    }
}
