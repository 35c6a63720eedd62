//! Farm inventory domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// An inventory item as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InventoryItem {
    pub id: i64,
    pub item_name: String,
    pub quantity: i64,
    pub unit: String,
    pub consumption_rate: f64,
    pub category: String,
    pub last_updated: Option<DateTime<Utc>>,
}

impl InventoryItem {
    /// Whole days the current stock lasts at the recorded consumption rate.
    ///
    /// Returns `None` when nothing is being consumed.
    pub fn days_remaining(&self) -> Option<i64> {
        if self.consumption_rate <= 0.0 {
            return None;
        }
        Some((self.quantity.max(0) as f64 / self.consumption_rate).floor() as i64)
    }
}

/// Request payload for creating or updating an inventory item.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct InventoryItemRequest {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    #[validate(length(max = 100, message = "Item name must be at most 100 characters"))]
    pub item_name: String,

    #[validate(range(min = 0, message = "Quantity must be non-negative"))]
    pub quantity: i64,

    #[validate(length(min = 1, max = 20, message = "Unit must be between 1 and 20 characters"))]
    pub unit: String,

    #[validate(range(min = 0.0, message = "Consumption rate must be non-negative"))]
    pub consumption_rate: f64,

    #[validate(length(min = 1, max = 50, message = "Category must be between 1 and 50 characters"))]
    pub category: String,
}
