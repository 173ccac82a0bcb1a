//! # eSewa Checkout
//!
//! Gateway client for eSewa ePay v2: builds signed payment-form payloads
//! for initiation and verifies completion callbacks.

use crate::config::EsewaConfig;
use crate::signature::{checkout_message, format_amount, sign_message, SIGNED_FIELD_NAMES};
use crate::verify;
use async_trait::async_trait;
use checkout_core::{
    CheckoutResult, PaymentGateway, PurchasedItem, SignedCheckout, VerifiedPayment,
};
use reqwest::Client;
use tracing::{debug, instrument};

/// eSewa payment gateway client
///
/// Holds the merchant configuration and a shared HTTP client for the
/// transaction-status endpoint.
pub struct EsewaGateway {
    config: EsewaConfig,
    client: Client,
}

impl EsewaGateway {
    /// Create a new gateway client
    pub fn new(config: EsewaConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        let config = EsewaConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Merchant configuration
    pub fn config(&self) -> &EsewaConfig {
        &self.config
    }
}

#[async_trait]
impl PaymentGateway for EsewaGateway {
    #[instrument(skip(self, purchase), fields(transaction_uuid = %purchase.id))]
    fn initiate_checkout(&self, purchase: &PurchasedItem) -> CheckoutResult<SignedCheckout> {
        let total_amount = purchase.total_price;
        let message = checkout_message(
            &format_amount(total_amount),
            &purchase.id,
            &self.config.product_code,
        );
        let signature = sign_message(&self.config.secret_key, &message);

        debug!("Signed checkout payload for {}", purchase.id);

        Ok(SignedCheckout {
            amount: purchase.total_price,
            tax_amount: 0.0,
            total_amount,
            product_service_charge: 0.0,
            product_delivery_charge: 0.0,
            transaction_uuid: purchase.id.clone(),
            product_code: self.config.product_code.clone(),
            success_url: self.config.success_url.clone(),
            failure_url: self.config.failure_url.clone(),
            signed_field_names: SIGNED_FIELD_NAMES.to_string(),
            signature,
            gateway_form_url: self.config.form_url.clone(),
        })
    }

    #[instrument(skip(self, encoded_data))]
    async fn verify_callback(&self, encoded_data: &str) -> CheckoutResult<VerifiedPayment> {
        verify::verify_payment(&self.config, &self.client, encoded_data).await
    }

    fn gateway_name(&self) -> &'static str {
        "esewa"
    }
}
