//! # checkout-esewa
//!
//! eSewa payment gateway client for esewa-checkout-rs.
//!
//! This crate implements the two halves of the ePay v2 merchant flow:
//!
//! 1. **Initiation** - build a signed payment-form payload
//!    - HMAC-SHA256 over `total_amount`, `transaction_uuid`, `product_code`
//!    - base64-encoded signature
//!    - Best for: redirecting a customer to the hosted payment form
//!
//! 2. **Verification** - validate the completion callback
//!    - decode the base64 JSON document
//!    - recompute the signature over the gateway-specified fields
//!    - confirm status, transaction id, and amount against the
//!      transaction-status endpoint
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_esewa::EsewaGateway;
//! use checkout_core::PaymentGateway;
//!
//! // Create gateway from environment
//! let gateway = EsewaGateway::from_env()?;
//!
//! // Sign a pending purchase for the hosted form
//! let signed = gateway.initiate_checkout(&purchase)?;
//!
//! // On the success callback:
//! let verified = gateway.verify_callback(&encoded_data).await?;
//! assert_eq!(verified.status, "COMPLETE");
//! ```

pub mod checkout;
pub mod config;
pub mod signature;
pub mod verify;

// Re-exports
pub use checkout::EsewaGateway;
pub use config::EsewaConfig;
pub use signature::{
    checkout_message, constant_time_compare, format_amount, sign_message, SIGNED_FIELD_NAMES,
};
pub use verify::{decode_callback, CallbackPayload};
