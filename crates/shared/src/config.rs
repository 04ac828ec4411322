//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Payment gateway configuration.
    pub gateway: GatewayConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
///
/// Tokens are issued by the external identity provider; Botica only
/// validates them, so a shared secret is the only required setting.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for validating token signatures.
    pub secret: String,
}

/// Payment gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Secret API key for the gateway.
    pub secret_key: String,
    /// Signing secret for inbound webhook verification.
    pub webhook_secret: String,
    /// Base URL of the gateway API.
    #[serde(default = "default_gateway_url")]
    pub base_url: String,
    /// Request timeout for gateway calls, in seconds.
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
    /// Tolerance for webhook timestamp skew, in seconds.
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_secs: i64,
}

fn default_gateway_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_gateway_timeout() -> u64 {
    30
}

fn default_webhook_tolerance() -> i64 {
    300 // 5 minutes
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BOTICA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
