//! # eSewa Configuration
//!
//! Configuration management for the eSewa gateway integration.
//! All secrets are loaded from environment variables into an explicit
//! config object; nothing in the signing/verification path reads the
//! environment directly.

use checkout_core::CheckoutError;
use std::env;

/// Default ePay v2 hosted form endpoint (RC environment)
const DEFAULT_FORM_URL: &str = "https://rc-epay.esewa.com.np/api/epay/main/v2/form";

/// eSewa gateway configuration
#[derive(Debug, Clone)]
pub struct EsewaConfig {
    /// Shared HMAC secret issued by eSewa
    pub secret_key: String,

    /// Merchant product code (e.g. "EPAYTEST")
    pub product_code: String,

    /// Base URL of the gateway API (status endpoint lives under this)
    pub gateway_url: String,

    /// URL of the hosted payment form the signed payload is POSTed to
    pub form_url: String,

    /// URL the gateway redirects to after a successful payment
    pub success_url: String,

    /// URL the gateway redirects to after a failed payment
    pub failure_url: String,
}

impl EsewaConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `ESEWA_SECRET_KEY`
    /// - `ESEWA_PRODUCT_CODE`
    /// - `ESEWA_GATEWAY_URL`
    /// - `ESEWA_SUCCESS_URL`
    /// - `ESEWA_FAILURE_URL`
    ///
    /// Optional: `ESEWA_FORM_URL` (defaults to the RC form endpoint).
    pub fn from_env() -> Result<Self, CheckoutError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let secret_key = env::var("ESEWA_SECRET_KEY")
            .map_err(|_| CheckoutError::Configuration("ESEWA_SECRET_KEY not set".to_string()))?;

        let product_code = env::var("ESEWA_PRODUCT_CODE")
            .map_err(|_| CheckoutError::Configuration("ESEWA_PRODUCT_CODE not set".to_string()))?;

        let gateway_url = env::var("ESEWA_GATEWAY_URL")
            .map_err(|_| CheckoutError::Configuration("ESEWA_GATEWAY_URL not set".to_string()))?;

        let success_url = env::var("ESEWA_SUCCESS_URL")
            .map_err(|_| CheckoutError::Configuration("ESEWA_SUCCESS_URL not set".to_string()))?;

        let failure_url = env::var("ESEWA_FAILURE_URL")
            .map_err(|_| CheckoutError::Configuration("ESEWA_FAILURE_URL not set".to_string()))?;

        let form_url = env::var("ESEWA_FORM_URL").unwrap_or_else(|_| DEFAULT_FORM_URL.to_string());

        let config = Self {
            secret_key,
            product_code,
            gateway_url,
            form_url,
            success_url,
            failure_url,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        secret_key: impl Into<String>,
        product_code: impl Into<String>,
        gateway_url: impl Into<String>,
    ) -> Self {
        Self {
            secret_key: secret_key.into(),
            product_code: product_code.into(),
            gateway_url: gateway_url.into(),
            form_url: DEFAULT_FORM_URL.to_string(),
            success_url: "http://localhost:8080/payment/success".to_string(),
            failure_url: "http://localhost:8080/payment/failure".to_string(),
        }
    }

    fn validate(&self) -> Result<(), CheckoutError> {
        if self.secret_key.is_empty() {
            return Err(CheckoutError::Configuration(
                "ESEWA_SECRET_KEY must not be empty".to_string(),
            ));
        }
        if self.product_code.is_empty() {
            return Err(CheckoutError::Configuration(
                "ESEWA_PRODUCT_CODE must not be empty".to_string(),
            ));
        }
        for (name, url) in [
            ("ESEWA_GATEWAY_URL", &self.gateway_url),
            ("ESEWA_SUCCESS_URL", &self.success_url),
            ("ESEWA_FAILURE_URL", &self.failure_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CheckoutError::Configuration(format!(
                    "{} must be an http(s) URL",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Gateway transaction-status endpoint
    pub fn status_url(&self) -> String {
        format!(
            "{}/api/epay/transaction/status/",
            self.gateway_url.trim_end_matches('/')
        )
    }

    /// Check if pointed at the eSewa test environment
    pub fn is_test_mode(&self) -> bool {
        self.product_code == "EPAYTEST" || self.gateway_url.contains("rc.esewa")
    }

    /// Builder: set custom gateway base URL (for testing)
    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = url.into();
        self
    }

    /// Builder: set custom success/failure redirect URLs
    pub fn with_redirect_urls(
        mut self,
        success_url: impl Into<String>,
        failure_url: impl Into<String>,
    ) -> Self {
        self.success_url = success_url.into();
        self.failure_url = failure_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_url() {
        let config = EsewaConfig::new("secret", "EPAYTEST", "https://rc.esewa.com.np");
        assert_eq!(
            config.status_url(),
            "https://rc.esewa.com.np/api/epay/transaction/status/"
        );

        // trailing slash is normalized
        let config = EsewaConfig::new("secret", "EPAYTEST", "https://rc.esewa.com.np/");
        assert_eq!(
            config.status_url(),
            "https://rc.esewa.com.np/api/epay/transaction/status/"
        );
    }

    #[test]
    fn test_test_mode_detection() {
        let config = EsewaConfig::new("secret", "EPAYTEST", "https://rc.esewa.com.np");
        assert!(config.is_test_mode());

        let config = EsewaConfig::new("secret", "NP-ES-MERCHANT", "https://epay.esewa.com.np");
        assert!(!config.is_test_mode());
    }

    #[test]
    fn test_builder_overrides() {
        let config = EsewaConfig::new("secret", "EPAYTEST", "https://rc.esewa.com.np")
            .with_gateway_url("http://127.0.0.1:9000")
            .with_redirect_urls("http://localhost/ok", "http://localhost/fail");

        assert_eq!(config.gateway_url, "http://127.0.0.1:9000");
        assert_eq!(config.success_url, "http://localhost/ok");
        assert_eq!(config.failure_url, "http://localhost/fail");
    }
}
