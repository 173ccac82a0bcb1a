//! # Item Types
//!
//! Purchasable items for the checkout backend.
//! A seed catalog may be loaded from `config/items.toml`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tolerance for comparing monetary amounts (NPR).
///
/// Amounts travel as decimal rupee values, so equality checks must absorb
/// float representation noise smaller than one paisa.
pub const AMOUNT_TOLERANCE: f64 = 0.01;

/// Compare two monetary amounts within [`AMOUNT_TOLERANCE`]
pub fn amounts_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= AMOUNT_TOLERANCE
}

/// A purchasable item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique item identifier
    #[serde(default = "new_item_id")]
    pub id: String,

    /// Display name
    pub name: String,

    /// Price in NPR
    pub price: f64,

    /// Whether this item is available for purchase
    #[serde(default = "default_true")]
    pub active: bool,

    /// Created timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn new_item_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_true() -> bool {
    true
}

impl Item {
    /// Create a new item with a generated ID
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            id: new_item_id(),
            name: name.into(),
            price,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Check whether a requested total matches this item's price
    pub fn price_matches(&self, total_price: f64) -> bool {
        amounts_equal(self.price, total_price)
    }
}

/// Seed catalog of items (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: Vec<Item>,
}

impl ItemCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
