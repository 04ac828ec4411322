//! Botica API Server
//!
//! Main entry point for the Botica backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use botica_api::{AppState, create_router};
use botica_db::connect;
use botica_payments::{PaymentReconciler, SignatureVerifier, StripeGateway};
use botica_shared::{AppConfig, JwtValidator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "botica=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Payment gateway client and webhook verifier
    let gateway = StripeGateway::new(&config.gateway)
        .map_err(|e| anyhow::anyhow!("Failed to build gateway client: {e}"))?;
    let verifier = SignatureVerifier::new(
        config.gateway.webhook_secret.clone(),
        config.gateway.webhook_tolerance_secs,
    );
    let reconciler = PaymentReconciler::new(db.clone(), Arc::new(gateway), verifier);

    // Create application state
    let state = AppState {
        db,
        jwt: Arc::new(JwtValidator::new(&config.jwt.secret)),
        reconciler: Arc::new(reconciler),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
