//! Stock reconciliation engine
//!
//! The only component that mutates stock state, always through the store's
//! atomic primitives so the ledger and the aggregate rows move in lockstep.
//! All read models (totals, low-stock list, dashboard) are served from the
//! aggregate rows; the ledger is history, never the read path.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use shared::models::{
    stock_status, DashboardStats, InventoryItem, InventoryRecord, LowStockItem, Product,
    ProductStock, ProductStockByLocation, StockMovement, StockStatus,
};

use crate::error::{AppError, AppResult};
use crate::store::Store;

/// Note attached to the movement created by initial-inventory setup
pub const NOTE_INITIAL_INVENTORY: &str = "Initial inventory";

/// Stock service coordinating the ledger and the aggregate store
#[derive(Clone)]
pub struct StockService {
    store: Arc<dyn Store>,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Fail with `UnknownReference` unless both ends of the pair exist
    async fn require_refs(&self, product_id: Uuid, location_id: Uuid) -> AppResult<()> {
        if self.store.get_product(product_id).await?.is_none() {
            return Err(AppError::UnknownReference("Product".to_string()));
        }
        if self.store.get_location(location_id).await?.is_none() {
            return Err(AppError::UnknownReference("Location".to_string()));
        }
        Ok(())
    }

    /// Record a signed stock movement for a (product, location) pair
    ///
    /// The canonical add/remove entry point used by manual adjustments and
    /// imports. Appends to the ledger and applies the delta to the
    /// aggregate row in one atomic step.
    pub async fn record_movement(
        &self,
        product_id: Uuid,
        location_id: Uuid,
        delta: i64,
        note: Option<String>,
    ) -> AppResult<StockMovement> {
        if delta == 0 {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Movement quantity cannot be zero".to_string(),
            });
        }

        self.require_refs(product_id, location_id).await?;

        let (movement, record) = self
            .store
            .apply_delta(product_id, location_id, delta, note)
            .await?;

        tracing::debug!(
            %product_id, %location_id, delta, quantity = record.quantity,
            "stock movement recorded"
        );

        Ok(movement)
    }

    /// Set the absolute quantity for a pair, logging the implied delta
    ///
    /// Used when the caller knows the target quantity rather than the
    /// change, e.g. inventory snapshot imports and direct edits.
    pub async fn set_absolute_quantity(
        &self,
        product_id: Uuid,
        location_id: Uuid,
        new_quantity: i64,
        note: Option<String>,
    ) -> AppResult<InventoryRecord> {
        if new_quantity < 0 {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity cannot be negative".to_string(),
            });
        }

        self.require_refs(product_id, location_id).await?;

        let (record, _delta) = self
            .store
            .apply_absolute(product_id, location_id, new_quantity, note)
            .await?;

        Ok(record)
    }

    /// Create the first inventory record for a pair
    pub async fn create_initial_inventory(
        &self,
        product_id: Uuid,
        location_id: Uuid,
        quantity: i64,
    ) -> AppResult<InventoryRecord> {
        if quantity < 0 {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity cannot be negative".to_string(),
            });
        }

        self.require_refs(product_id, location_id).await?;

        if self.store.get_record(product_id, location_id).await?.is_some() {
            return Err(AppError::DuplicateEntry(
                "inventory record for this product and location".to_string(),
            ));
        }

        let (_movement, record) = self
            .store
            .apply_delta(
                product_id,
                location_id,
                quantity,
                Some(NOTE_INITIAL_INVENTORY.to_string()),
            )
            .await?;

        Ok(record)
    }

    /// Delete a pair's aggregate row; the ledger keeps its full history
    pub async fn remove_inventory(&self, product_id: Uuid, location_id: Uuid) -> AppResult<()> {
        self.store.remove_record(product_id, location_id).await
    }

    /// Total on-hand quantity for a product across all locations
    pub async fn product_total_stock(&self, product_id: Uuid) -> AppResult<i64> {
        let records = self.store.list_records_for_product(product_id).await?;
        Ok(records.iter().map(|r| r.quantity).sum())
    }

    /// Per-location stock breakdown for a product
    pub async fn product_stock(&self, product_id: Uuid) -> AppResult<ProductStock> {
        if self.store.get_product(product_id).await?.is_none() {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let records = self.store.list_records_for_product(product_id).await?;
        let locations = self.location_names().await?;

        let by_location = records
            .iter()
            .map(|r| ProductStockByLocation {
                location_id: r.location_id,
                location_name: locations
                    .get(&r.location_id)
                    .cloned()
                    .unwrap_or_default(),
                quantity: r.quantity,
            })
            .collect();

        Ok(ProductStock {
            product_id,
            total_quantity: records.iter().map(|r| r.quantity).sum(),
            by_location,
        })
    }

    /// All aggregate rows joined with catalog context
    pub async fn list_inventory(&self) -> AppResult<Vec<InventoryItem>> {
        let records = self.store.list_records().await?;
        let products = self.product_index().await?;
        let locations = self.location_names().await?;

        Ok(records
            .into_iter()
            .filter_map(|record| {
                let product = products.get(&record.product_id)?;
                let location_name = locations.get(&record.location_id)?;
                let status = stock_status(record.quantity, product.min_stock_level);
                Some(InventoryItem {
                    product_name: product.name.clone(),
                    sku: product.sku.clone(),
                    location_name: location_name.clone(),
                    min_stock_level: product.min_stock_level,
                    status,
                    record,
                })
            })
            .collect())
    }

    /// Low- and out-of-stock rows, most critical first
    pub async fn low_stock_items(&self) -> AppResult<Vec<LowStockItem>> {
        let records = self.store.list_records().await?;
        let products = self.product_index().await?;
        let locations = self.location_names().await?;

        let mut items: Vec<LowStockItem> = records
            .into_iter()
            .filter_map(|record| {
                let product = products.get(&record.product_id)?;
                let location_name = locations.get(&record.location_id)?;
                let status = stock_status(record.quantity, product.min_stock_level);
                if status == StockStatus::InStock {
                    return None;
                }
                let criticality =
                    record.quantity as f64 / f64::from(product.min_stock_level.max(1));
                Some(LowStockItem {
                    product_name: product.name.clone(),
                    sku: product.sku.clone(),
                    location_name: location_name.clone(),
                    min_stock_level: product.min_stock_level,
                    status,
                    criticality,
                    record,
                })
            })
            .collect();

        items.sort_by(|a, b| {
            a.criticality
                .partial_cmp(&b.criticality)
                .unwrap_or(Ordering::Equal)
        });

        Ok(items)
    }

    /// Dashboard metrics over the aggregate rows and the ledger count
    pub async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let products = self.product_index().await?;
        let records = self.store.list_records().await?;

        let mut low_stock_items = 0i64;
        let mut inventory_value = Decimal::ZERO;
        for record in &records {
            if let Some(product) = products.get(&record.product_id) {
                if stock_status(record.quantity, product.min_stock_level) != StockStatus::InStock {
                    low_stock_items += 1;
                }
                inventory_value += Decimal::from(record.quantity) * product.unit_cost;
            }
        }

        Ok(DashboardStats {
            total_products: products.len() as i64,
            low_stock_items,
            inventory_value,
            recent_movement_count: self.store.count_movements().await?,
        })
    }

    /// Most recent ledger entries, newest first
    pub async fn recent_movements(&self, limit: i64) -> AppResult<Vec<StockMovement>> {
        self.store.list_recent_movements(limit).await
    }

    /// Full movement history for a product, newest first
    pub async fn movements_for_product(&self, product_id: Uuid) -> AppResult<Vec<StockMovement>> {
        if self.store.get_product(product_id).await?.is_none() {
            return Err(AppError::NotFound("Product".to_string()));
        }
        self.store.list_movements_for_product(product_id).await
    }

    async fn product_index(&self) -> AppResult<HashMap<Uuid, Product>> {
        Ok(self
            .store
            .list_products()
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect())
    }

    async fn location_names(&self) -> AppResult<HashMap<Uuid, String>> {
        Ok(self
            .store
            .list_locations()
            .await?
            .into_iter()
            .map(|l| (l.id, l.name))
            .collect())
    }
}
