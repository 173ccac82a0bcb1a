//! # In-Memory Store
//!
//! Entity storage for users, items, purchases, and payments.
//!
//! Maps are guarded by `RwLock`; locks are held only for the duration of a
//! store call and never across an await point. Payments are keyed by the
//! gateway transaction code, which makes callback re-delivery idempotent.

use crate::error::{CheckoutError, CheckoutResult};
use crate::item::Item;
use crate::purchase::{Payment, PurchasedItem};
use crate::user::User;
use std::collections::HashMap;
use std::sync::RwLock;

/// Process-local store for all checkout entities
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    items: RwLock<HashMap<String, Item>>,
    purchases: RwLock<HashMap<String, PurchasedItem>>,
    payments: RwLock<HashMap<String, Payment>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    // ----- users -----

    /// Insert a user; rejects an already-registered email
    pub fn insert_user(&self, user: User) -> CheckoutResult<User> {
        let mut users = self.users.write().expect("store lock poisoned");
        if users.values().any(|u| u.email == user.email) {
            return Err(CheckoutError::UserExists { email: user.email });
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    /// Look up a user by email
    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        let users = self.users.read().expect("store lock poisoned");
        users.values().find(|u| u.email == email).cloned()
    }

    // ----- items -----

    /// Insert an item
    pub fn insert_item(&self, item: Item) -> Item {
        let mut items = self.items.write().expect("store lock poisoned");
        items.insert(item.id.clone(), item.clone());
        item
    }

    /// Fetch an item by id
    pub fn get_item(&self, item_id: &str) -> CheckoutResult<Item> {
        let items = self.items.read().expect("store lock poisoned");
        items
            .get(item_id)
            .cloned()
            .ok_or_else(|| CheckoutError::ItemNotFound {
                item_id: item_id.to_string(),
            })
    }

    // ----- purchases -----

    /// Insert a purchase record
    pub fn insert_purchase(&self, purchase: PurchasedItem) -> PurchasedItem {
        let mut purchases = self.purchases.write().expect("store lock poisoned");
        purchases.insert(purchase.id.clone(), purchase.clone());
        purchase
    }

    /// Fetch a purchase by its id / transaction uuid
    pub fn get_purchase(&self, transaction_uuid: &str) -> CheckoutResult<PurchasedItem> {
        let purchases = self.purchases.read().expect("store lock poisoned");
        purchases
            .get(transaction_uuid)
            .cloned()
            .ok_or_else(|| CheckoutError::PurchaseNotFound {
                transaction_uuid: transaction_uuid.to_string(),
            })
    }

    /// Transition a purchase to completed
    pub fn complete_purchase(&self, transaction_uuid: &str) -> CheckoutResult<PurchasedItem> {
        let mut purchases = self.purchases.write().expect("store lock poisoned");
        let purchase =
            purchases
                .get_mut(transaction_uuid)
                .ok_or_else(|| CheckoutError::PurchaseNotFound {
                    transaction_uuid: transaction_uuid.to_string(),
                })?;
        purchase.mark_completed();
        Ok(purchase.clone())
    }

    /// Transition a purchase to failed.
    ///
    /// Only a pending purchase can fail; a completed one stays completed
    /// even if a bad callback arrives for it afterwards.
    pub fn fail_purchase(&self, transaction_uuid: &str) -> CheckoutResult<PurchasedItem> {
        let mut purchases = self.purchases.write().expect("store lock poisoned");
        let purchase =
            purchases
                .get_mut(transaction_uuid)
                .ok_or_else(|| CheckoutError::PurchaseNotFound {
                    transaction_uuid: transaction_uuid.to_string(),
                })?;
        if purchase.is_pending() {
            purchase.mark_failed();
        }
        Ok(purchase.clone())
    }

    // ----- payments -----

    /// Record a payment audit row.
    ///
    /// Returns `false` when a payment with the same transaction code is
    /// already recorded; the existing record is left untouched.
    pub fn record_payment(&self, payment: Payment) -> bool {
        let mut payments = self.payments.write().expect("store lock poisoned");
        if payments.contains_key(&payment.transaction_code) {
            return false;
        }
        payments.insert(payment.transaction_code.clone(), payment);
        true
    }

    /// Fetch a payment by gateway transaction code
    pub fn find_payment(&self, transaction_code: &str) -> Option<Payment> {
        let payments = self.payments.read().expect("store lock poisoned");
        payments.get(transaction_code).cloned()
    }

    /// Number of recorded payments
    pub fn payment_count(&self) -> usize {
        self.payments.read().expect("store lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();

        store
            .insert_user(User::new("Asha", "asha@example.com", "$2b$12$a"))
            .unwrap();

        let err = store
            .insert_user(User::new("Other", "asha@example.com", "$2b$12$b"))
            .unwrap_err();
        assert!(matches!(err, CheckoutError::UserExists { .. }));

        // the original user is untouched
        let user = store.find_user_by_email("asha@example.com").unwrap();
        assert_eq!(user.name, "Asha");
    }

    #[test]
    fn test_item_lookup() {
        let store = MemoryStore::new();
        let item = store.insert_item(Item::new("Mouse", 1500.0));

        assert_eq!(store.get_item(&item.id).unwrap().name, "Mouse");
        assert!(matches!(
            store.get_item("missing"),
            Err(CheckoutError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn test_purchase_transitions() {
        let store = MemoryStore::new();
        let item = store.insert_item(Item::new("Mouse", 1500.0));
        let purchase = store.insert_purchase(PurchasedItem::new(&item, "esewa"));

        let completed = store.complete_purchase(&purchase.id).unwrap();
        assert_eq!(
            completed.status,
            crate::purchase::PurchaseStatus::Completed
        );

        assert!(matches!(
            store.complete_purchase("missing"),
            Err(CheckoutError::PurchaseNotFound { .. })
        ));
    }

    #[test]
    fn test_payment_idempotency() {
        let store = MemoryStore::new();
        let item = store.insert_item(Item::new("Mouse", 1500.0));
        let purchase = store.insert_purchase(PurchasedItem::new(&item, "esewa"));

        let payment = Payment::verified("TXN1", &purchase, "esewa", json!({}), json!({}));
        assert!(store.record_payment(payment.clone()));
        assert!(!store.record_payment(payment));
        assert_eq!(store.payment_count(), 1);
        assert!(store.find_payment("TXN1").is_some());
    }
}
