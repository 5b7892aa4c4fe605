//! Inventory summaries built from the item list.

use crate::{entities::item::Model as ItemModel, models::DEFAULT_CATEGORY};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Items with fewer units than this count as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 5;
/// How many of the newest items a summary lists.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryStats {
    pub total_items: u64,
    pub total_quantity: i64,
    /// Sum of `price * quantity` over priced items
    pub total_value: Decimal,
    /// Distinct categories, sorted
    pub categories: Vec<String>,
    pub low_stock: Vec<ItemModel>,
    /// Newest first
    pub recent: Vec<ItemModel>,
    pub generated_at: DateTime<Utc>,
}

impl InventoryStats {
    /// Summarises `items`. `total_items` comes from the count endpoint, which may
    /// have been answered by the fallback service.
    pub fn summarize(total_items: u64, items: &[ItemModel]) -> Self {
        let categories: BTreeSet<String> = items
            .iter()
            .map(|item| {
                let category = item.category.trim();
                if category.is_empty() {
                    DEFAULT_CATEGORY.to_string()
                } else {
                    category.to_string()
                }
            })
            .collect();

        let total_value = items
            .iter()
            .filter_map(|item| item.price.map(|p| p * Decimal::from(item.quantity)))
            .sum();

        let low_stock = items
            .iter()
            .filter(|item| item.quantity < LOW_STOCK_THRESHOLD)
            .cloned()
            .collect();

        let mut recent = items.to_vec();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(RECENT_LIMIT);

        Self {
            total_items,
            total_quantity: items.iter().map(|item| i64::from(item.quantity)).sum(),
            total_value,
            categories: categories.into_iter().collect(),
            low_stock,
            recent,
            generated_at: Utc::now(),
        }
    }
}

/// Items whose name, category or description contains `term`, ignoring case.
/// A blank term keeps every item.
pub fn filter_items(items: &[ItemModel], term: &str) -> Vec<ItemModel> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| {
            item.name.to_lowercase().contains(&term)
                || item.category.to_lowercase().contains(&term)
                || item
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}
