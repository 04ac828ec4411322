//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the credit ledger and payment reconciler
//! - Authentication middleware validating identity-provider tokens
//! - HTTP status mapping of the core error taxonomy

pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use botica_payments::PaymentReconciler;
use botica_shared::JwtValidator;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DatabaseConnection,
    /// Validator for identity-provider tokens.
    pub jwt: Arc<JwtValidator>,
    /// Payment reconciler.
    pub reconciler: Arc<PaymentReconciler>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
