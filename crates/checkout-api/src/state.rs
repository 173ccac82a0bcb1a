//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the payment gateway, auth configuration, and the entity store.

use checkout_core::{BoxedPaymentGateway, CheckoutError, ItemCatalog, MemoryStore};
use checkout_esewa::EsewaGateway;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base URL for redirects
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Token-signing configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for JWT signing
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expires_in_hours: i64,
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// Required: `JWT_SECRET`. Optional: `JWT_EXPIRES_IN_HOURS` (default 24).
    pub fn from_env() -> Result<Self, CheckoutError> {
        dotenvy::dotenv().ok();

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| CheckoutError::Configuration("JWT_SECRET not set".to_string()))?;
        if jwt_secret.is_empty() {
            return Err(CheckoutError::Configuration(
                "JWT_SECRET must not be empty".to_string(),
            ));
        }

        let jwt_expires_in_hours = std::env::var("JWT_EXPIRES_IN_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24);

        Ok(Self {
            jwt_secret,
            jwt_expires_in_hours,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(jwt_secret: impl Into<String>, jwt_expires_in_hours: i64) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            jwt_expires_in_hours,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Token-signing config
    pub auth: AuthConfig,
    /// Payment gateway
    pub gateway: BoxedPaymentGateway,
    /// Entity store
    pub store: Arc<MemoryStore>,
}

impl AppState {
    /// Create a new AppState with the eSewa gateway from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let auth = AuthConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load auth config: {}", e))?;

        let gateway = EsewaGateway::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize eSewa gateway: {}", e))?;

        let store = Arc::new(MemoryStore::new());
        seed_items(&store);

        Ok(Self {
            config,
            auth,
            gateway: Arc::new(gateway),
            store,
        })
    }

    /// Create state with explicit parts (for testing)
    pub fn with_gateway(
        config: AppConfig,
        auth: AuthConfig,
        gateway: BoxedPaymentGateway,
    ) -> Self {
        Self {
            config,
            auth,
            gateway,
            store: Arc::new(MemoryStore::new()),
        }
    }
}

/// Seed the store from an optional config file
fn seed_items(store: &MemoryStore) {
    // Try to load from config/items.toml
    let config_paths = [
        "config/items.toml",
        "../config/items.toml",
        "../../config/items.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            match toml::from_str::<ItemCatalog>(&content) {
                Ok(catalog) => {
                    let count = catalog.items.len();
                    for item in catalog.items {
                        store.insert_item(item);
                    }
                    tracing::info!("Seeded {} items from {}", count, path);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path, e);
                }
            }
            return;
        }
    }

    tracing::warn!("No item catalog found, starting with an empty store");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        // Clear env vars for test
        std::env::remove_var("HOST");
        std::env::remove_var("PORT");
        std::env::remove_var("BASE_URL");

        let config = AppConfig::from_env();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            environment: "test".to_string(),
        };

        let addr = config.socket_addr();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_auth_config_explicit() {
        let auth = AuthConfig::new("test-secret", 2);
        assert_eq!(auth.jwt_secret, "test-secret");
        assert_eq!(auth.jwt_expires_in_hours, 2);
    }
}
