//! Inventory models: stock aggregates, the movement ledger, and derived status

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current on-hand quantity for a (product, location) pair
///
/// At most one record exists per pair. Created lazily by the first movement
/// recorded for the pair; subsequent movements update it in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub quantity: i64,
    pub updated_at: DateTime<Utc>,
}

/// A signed stock change for a (product, location) pair
///
/// Movements are append-only: corrections are made by recording a
/// compensating movement, never by editing history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub location_id: Uuid,
    /// Positive = addition, negative = removal
    pub quantity: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Stock classification for an aggregate row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }
}

/// Classify a quantity against a product's minimum stock level
///
/// The boundary is inclusive: a quantity exactly at the minimum is low
/// stock. Zero or below is out of stock. Every call site uses this one
/// rule.
pub fn stock_status(quantity: i64, min_stock_level: i32) -> StockStatus {
    if quantity <= 0 {
        StockStatus::OutOfStock
    } else if quantity <= i64::from(min_stock_level) {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

/// Aggregate row joined with catalog context for display
#[derive(Debug, Clone, Serialize)]
pub struct InventoryItem {
    #[serde(flatten)]
    pub record: InventoryRecord,
    pub product_name: String,
    pub sku: String,
    pub location_name: String,
    pub min_stock_level: i32,
    pub status: StockStatus,
}

/// A low- or out-of-stock aggregate row, with its criticality ratio
#[derive(Debug, Clone, Serialize)]
pub struct LowStockItem {
    #[serde(flatten)]
    pub record: InventoryRecord,
    pub product_name: String,
    pub sku: String,
    pub location_name: String,
    pub min_stock_level: i32,
    pub status: StockStatus,
    /// quantity / max(min_stock_level, 1); smaller is more critical
    pub criticality: f64,
}

/// Dashboard metrics
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_products: i64,
    pub low_stock_items: i64,
    pub inventory_value: Decimal,
    /// All-time count of ledger entries
    pub recent_movement_count: i64,
}

/// Per-location quantity within a product stock breakdown
#[derive(Debug, Clone, Serialize)]
pub struct ProductStockByLocation {
    pub location_id: Uuid,
    pub location_name: String,
    pub quantity: i64,
}

/// Total stock for a product across all locations
#[derive(Debug, Clone, Serialize)]
pub struct ProductStock {
    pub product_id: Uuid,
    pub total_quantity: i64,
    pub by_location: Vec<ProductStockByLocation>,
}

/// Input for recording a relative stock movement
#[derive(Debug, Deserialize)]
pub struct RecordMovementInput {
    pub product_id: Uuid,
    pub location_id: Uuid,
    /// Signed delta; positive adds stock, negative removes it
    pub quantity: i64,
    pub note: Option<String>,
}

/// Input for setting an absolute quantity on a pair
#[derive(Debug, Deserialize)]
pub struct SetQuantityInput {
    pub quantity: i64,
    pub note: Option<String>,
}

/// Input for creating initial inventory for a pair
#[derive(Debug, Deserialize)]
pub struct CreateInventoryInput {
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub quantity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_boundaries_are_inclusive() {
        assert_eq!(stock_status(0, 10), StockStatus::OutOfStock);
        assert_eq!(stock_status(1, 10), StockStatus::LowStock);
        assert_eq!(stock_status(10, 10), StockStatus::LowStock);
        assert_eq!(stock_status(11, 10), StockStatus::InStock);
    }

    #[test]
    fn negative_quantity_is_out_of_stock() {
        assert_eq!(stock_status(-3, 10), StockStatus::OutOfStock);
    }

    #[test]
    fn zero_minimum_leaves_only_two_states() {
        assert_eq!(stock_status(0, 0), StockStatus::OutOfStock);
        assert_eq!(stock_status(1, 0), StockStatus::InStock);
    }
}
