//! # checkout-core
//!
//! Core types and traits for the esewa-checkout backend.
//!
//! This crate provides:
//! - `PaymentGateway` trait for payment provider integrations
//! - `Item` and `ItemCatalog` for purchasable items
//! - `PurchasedItem` and `Payment` for the checkout flow and audit trail
//! - `User` for registered accounts
//! - `MemoryStore` for process-local entity storage
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{Item, MemoryStore, PurchasedItem, PaymentGateway};
//!
//! // Create a pending purchase
//! let item = store.get_item(&item_id)?;
//! let purchase = store.insert_purchase(PurchasedItem::new(&item, "esewa"));
//!
//! // Ask the gateway for a signed form payload
//! let signed = gateway.initiate_checkout(&purchase)?;
//!
//! // Later, on the gateway callback:
//! let verified = gateway.verify_callback(&encoded_data).await?;
//! store.complete_purchase(&verified.transaction_uuid)?;
//! ```

pub mod error;
pub mod gateway;
pub mod item;
pub mod purchase;
pub mod store;
pub mod user;

// Re-exports for convenience
pub use error::{CheckoutError, CheckoutResult};
pub use gateway::{BoxedPaymentGateway, PaymentGateway, SignedCheckout, VerifiedPayment};
pub use item::{amounts_equal, Item, ItemCatalog, AMOUNT_TOLERANCE};
pub use purchase::{Payment, PaymentStatus, PurchaseStatus, PurchasedItem};
pub use store::MemoryStore;
pub use user::User;
