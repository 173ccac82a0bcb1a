//! # Payment Gateway Trait
//!
//! Seam between the checkout flow and a concrete payment provider.
//! The eSewa client implements this; tests substitute their own.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             PaymentGateway (trait)          │
//! │  ├── initiate_checkout()                    │
//! │  ├── verify_callback()                      │
//! │  └── gateway_name()                         │
//! └─────────────────────────────────────────────┘
//!                       ▲
//!                       │
//!               ┌───────┴───────┐
//!               │ EsewaGateway  │
//!               └───────────────┘
//! ```

use crate::error::CheckoutResult;
use crate::purchase::PurchasedItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A signed payment-form payload for the gateway's hosted checkout page.
///
/// The field set matches the eSewa ePay v2 form contract; `signature`
/// covers the fields listed in `signed_field_names`, in that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedCheckout {
    pub amount: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub product_service_charge: f64,
    pub product_delivery_charge: f64,

    /// Client-chosen transaction identifier (the purchase id)
    pub transaction_uuid: String,

    /// Merchant product code
    pub product_code: String,

    pub success_url: String,
    pub failure_url: String,

    /// Ordered list of fields covered by the signature
    pub signed_field_names: String,

    /// base64 HMAC-SHA256 over the signed fields
    pub signature: String,

    /// URL of the gateway's hosted payment form to POST this payload to
    pub gateway_form_url: String,
}

/// Outcome of a successfully verified payment callback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedPayment {
    /// Gateway-assigned transaction code
    pub transaction_code: String,

    /// Our transaction identifier (purchase id)
    pub transaction_uuid: String,

    /// Amount the gateway settled (NPR)
    pub total_amount: f64,

    /// Remote status; "COMPLETE" for a settled transaction
    pub status: String,

    /// Raw payload returned by the gateway's status endpoint
    pub status_response: serde_json::Value,

    /// Decoded callback payload as received from the user agent
    pub callback: serde_json::Value,
}

/// Core trait for payment gateway implementations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Build the signed form payload that sends a pending purchase to the
    /// gateway's hosted checkout page. Pure; no remote call.
    fn initiate_checkout(&self, purchase: &PurchasedItem) -> CheckoutResult<SignedCheckout>;

    /// Verify a base64-encoded callback payload: decode it, recompute the
    /// signature, then confirm the transaction against the gateway's
    /// status endpoint.
    ///
    /// Callers must not mark a purchase complete unless this returns `Ok`.
    async fn verify_callback(&self, encoded_data: &str) -> CheckoutResult<VerifiedPayment>;

    /// Gateway name (for logging and audit records)
    fn gateway_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckoutError;
    use crate::item::Item;

    struct StubGateway;

    #[async_trait]
    impl PaymentGateway for StubGateway {
        fn initiate_checkout(&self, purchase: &PurchasedItem) -> CheckoutResult<SignedCheckout> {
            Ok(SignedCheckout {
                amount: purchase.total_price,
                tax_amount: 0.0,
                total_amount: purchase.total_price,
                product_service_charge: 0.0,
                product_delivery_charge: 0.0,
                transaction_uuid: purchase.id.clone(),
                product_code: "EPAYTEST".into(),
                success_url: "http://localhost/payment/success".into(),
                failure_url: "http://localhost/payment/failure".into(),
                signed_field_names: "total_amount,transaction_uuid,product_code".into(),
                signature: "c3R1Yg==".into(),
                gateway_form_url: "http://localhost/form".into(),
            })
        }

        async fn verify_callback(&self, _encoded: &str) -> CheckoutResult<VerifiedPayment> {
            Err(CheckoutError::SignatureMismatch {
                transaction_uuid: None,
            })
        }

        fn gateway_name(&self) -> &'static str {
            "stub"
        }
    }

    #[tokio::test]
    async fn test_gateway_trait_object() {
        let gateway: BoxedPaymentGateway = Arc::new(StubGateway);
        let item = Item::new("Test", 100.0);
        let purchase = PurchasedItem::new(&item, "esewa");

        let signed = gateway.initiate_checkout(&purchase).unwrap();
        assert_eq!(signed.transaction_uuid, purchase.id);
        assert_eq!(gateway.gateway_name(), "stub");

        let err = gateway.verify_callback("bogus").await.unwrap_err();
        assert!(err.is_verification_failure());
    }
}
