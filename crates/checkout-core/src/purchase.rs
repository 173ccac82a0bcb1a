//! # Purchase Types
//!
//! Purchase records and the payment audit trail.
//!
//! A `PurchasedItem` is created when checkout is initiated and moves
//! `pending -> completed` once the gateway confirms payment, or
//! `pending -> failed` when a callback for it fails verification.
//! A `Payment` is the immutable audit record written only after a
//! successful verification.

use crate::item::Item;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Checkout initiated, awaiting gateway confirmation
    Pending,
    /// Gateway verified the payment
    Completed,
    /// A callback for this purchase failed verification
    Failed,
}

impl Default for PurchaseStatus {
    fn default() -> Self {
        PurchaseStatus::Pending
    }
}

/// A purchase created at checkout initiation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchasedItem {
    /// Unique purchase ID; doubles as the gateway `transaction_uuid`
    pub id: String,

    /// Referenced item
    pub item_id: String,

    /// Item name (denormalized for display)
    pub item_name: String,

    /// Price snapshot at initiation time (NPR)
    pub total_price: f64,

    /// Payment method (e.g. "esewa")
    pub payment_method: String,

    /// Purchase status
    #[serde(default)]
    pub status: PurchaseStatus,

    /// Created timestamp
    pub created_at: DateTime<Utc>,

    /// Last status change
    pub updated_at: DateTime<Utc>,
}

impl PurchasedItem {
    /// Create a pending purchase for an item.
    ///
    /// The snapshot price is the stored item price, not the requested one;
    /// callers validate the two match before getting here.
    pub fn new(item: &Item, payment_method: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            total_price: item.price,
            payment_method: payment_method.into(),
            status: PurchaseStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition to completed
    pub fn mark_completed(&mut self) {
        self.status = PurchaseStatus::Completed;
        self.updated_at = Utc::now();
    }

    /// Transition to failed
    pub fn mark_failed(&mut self) {
        self.status = PurchaseStatus::Failed;
        self.updated_at = Utc::now();
    }

    /// Check if this purchase is still awaiting confirmation
    pub fn is_pending(&self) -> bool {
        self.status == PurchaseStatus::Pending
    }
}

/// Status recorded on a payment audit row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Success,
    Pending,
    Failed,
}

/// Immutable audit record of a verified payment.
///
/// Keyed by the gateway transaction code; a re-delivered callback must not
/// produce a second record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Gateway transaction code (unique per transaction)
    pub transaction_code: String,

    /// The purchase this payment settles
    pub purchase_id: String,

    /// Amount paid (NPR)
    pub amount: f64,

    /// Raw response from the gateway status endpoint
    pub verification_response: serde_json::Value,

    /// Raw callback query as received from the user agent
    pub callback_query: serde_json::Value,

    /// Gateway name (e.g. "esewa")
    pub gateway: String,

    /// Payment status
    pub status: PaymentStatus,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Record a successfully verified payment
    pub fn verified(
        transaction_code: impl Into<String>,
        purchase: &PurchasedItem,
        gateway: impl Into<String>,
        verification_response: serde_json::Value,
        callback_query: serde_json::Value,
    ) -> Self {
        Self {
            transaction_code: transaction_code.into(),
            purchase_id: purchase.id.clone(),
            amount: purchase.total_price,
            verification_response,
            callback_query,
            gateway: gateway.into(),
            status: PaymentStatus::Success,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_purchase_lifecycle() {
        let item = Item::new("Test", 100.0);
        let mut purchase = PurchasedItem::new(&item, "esewa");

        assert_eq!(purchase.status, PurchaseStatus::Pending);
        assert!(purchase.is_pending());
        assert_eq!(purchase.total_price, 100.0);
        assert_eq!(purchase.item_id, item.id);

        purchase.mark_completed();
        assert_eq!(purchase.status, PurchaseStatus::Completed);
        assert!(!purchase.is_pending());
    }

    #[test]
    fn test_purchase_failure_transition() {
        let item = Item::new("Test", 100.0);
        let mut purchase = PurchasedItem::new(&item, "esewa");

        purchase.mark_failed();
        assert_eq!(purchase.status, PurchaseStatus::Failed);
    }

    #[test]
    fn test_payment_snapshot() {
        let item = Item::new("Test", 250.0);
        let purchase = PurchasedItem::new(&item, "esewa");

        let payment = Payment::verified(
            "000AXN5",
            &purchase,
            "esewa",
            json!({"status": "COMPLETE"}),
            json!({"data": "abc"}),
        );

        assert_eq!(payment.transaction_code, "000AXN5");
        assert_eq!(payment.purchase_id, purchase.id);
        assert_eq!(payment.amount, 250.0);
        assert_eq!(payment.status, PaymentStatus::Success);
    }

    #[test]
    fn test_status_serde_snake_case() {
        let s = serde_json::to_string(&PurchaseStatus::Completed).unwrap();
        assert_eq!(s, "\"completed\"");
        let s = serde_json::to_string(&PaymentStatus::Success).unwrap();
        assert_eq!(s, "\"success\"");
    }
}
