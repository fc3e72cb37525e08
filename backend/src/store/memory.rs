//! In-memory store
//!
//! Map-backed implementation of the storage contracts, used by the test
//! suite and the `memory` storage backend. A single mutex guards the whole
//! state: every write primitive is one serialized critical section, which
//! gives the same lockstep guarantee the Postgres store gets from its
//! transactions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use shared::models::{
    Category, CreateCategoryInput, CreateLocationInput, CreateProductInput, InventoryRecord,
    Location, Product, StockMovement, UpdateCategoryInput, UpdateLocationInput,
    UpdateProductInput, DEFAULT_MIN_STOCK_LEVEL,
};

use super::{
    CatalogStore, InventoryStore, NOTE_INVENTORY_REMOVED, NOTE_QUANTITY_ADJUSTED,
    NOTE_QUANTITY_CREATED,
};
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct MemoryState {
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
    products: HashMap<Uuid, Product>,
    // Keyed by (product_id, location_id): one aggregate row per pair
    records: HashMap<(Uuid, Uuid), InventoryRecord>,
    // Vec order is insertion order, the ledger's stable tiebreak
    movements: Vec<StockMovement>,
}

/// Thread-safe map-backed store
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store mutex poisoned")
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn create_category(&self, input: CreateCategoryInput) -> AppResult<Category> {
        let mut state = self.lock();

        if state.categories.values().any(|c| c.name == input.name) {
            return Err(AppError::DuplicateEntry("category name".to_string()));
        }

        let category = Category {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            created_at: Utc::now(),
        };
        state.categories.insert(category.id, category.clone());

        Ok(category)
    }

    async fn get_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        Ok(self.lock().categories.get(&id).cloned())
    }

    async fn get_category_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        Ok(self
            .lock()
            .categories
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let mut categories: Vec<Category> = self.lock().categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn update_category(&self, id: Uuid, input: UpdateCategoryInput) -> AppResult<Category> {
        let mut state = self.lock();

        let existing = state
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        let name = input.name.unwrap_or(existing.name);
        if state
            .categories
            .values()
            .any(|c| c.name == name && c.id != id)
        {
            return Err(AppError::DuplicateEntry("category name".to_string()));
        }

        let updated = Category {
            id,
            name,
            description: input.description.or(existing.description),
            created_at: existing.created_at,
        };
        state.categories.insert(id, updated.clone());

        Ok(updated)
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.lock();

        let product_count = state
            .products
            .values()
            .filter(|p| p.category_id == id)
            .count();
        if product_count > 0 {
            return Err(AppError::ReferentialIntegrity {
                resource: "Category".to_string(),
                dependents: format!("{} product(s)", product_count),
            });
        }

        state
            .categories
            .remove(&id)
            .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        Ok(())
    }

    async fn create_location(&self, input: CreateLocationInput) -> AppResult<Location> {
        let mut state = self.lock();

        if state.locations.values().any(|l| l.name == input.name) {
            return Err(AppError::DuplicateEntry("location name".to_string()));
        }

        let location = Location {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            created_at: Utc::now(),
        };
        state.locations.insert(location.id, location.clone());

        Ok(location)
    }

    async fn get_location(&self, id: Uuid) -> AppResult<Option<Location>> {
        Ok(self.lock().locations.get(&id).cloned())
    }

    async fn get_location_by_name(&self, name: &str) -> AppResult<Option<Location>> {
        Ok(self
            .lock()
            .locations
            .values()
            .find(|l| l.name == name)
            .cloned())
    }

    async fn list_locations(&self) -> AppResult<Vec<Location>> {
        let mut locations: Vec<Location> = self.lock().locations.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }

    async fn update_location(&self, id: Uuid, input: UpdateLocationInput) -> AppResult<Location> {
        let mut state = self.lock();

        let existing = state
            .locations
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Location".to_string()))?;

        let name = input.name.unwrap_or(existing.name);
        if state
            .locations
            .values()
            .any(|l| l.name == name && l.id != id)
        {
            return Err(AppError::DuplicateEntry("location name".to_string()));
        }

        let updated = Location {
            id,
            name,
            description: input.description.or(existing.description),
            created_at: existing.created_at,
        };
        state.locations.insert(id, updated.clone());

        Ok(updated)
    }

    async fn delete_location(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.lock();

        let dependents = state
            .records
            .values()
            .filter(|r| r.location_id == id)
            .count()
            + state
                .movements
                .iter()
                .filter(|m| m.location_id == id)
                .count();
        if dependents > 0 {
            return Err(AppError::ReferentialIntegrity {
                resource: "Location".to_string(),
                dependents: format!("{} inventory row(s) or movement(s)", dependents),
            });
        }

        state
            .locations
            .remove(&id)
            .ok_or_else(|| AppError::NotFound("Location".to_string()))?;

        Ok(())
    }

    async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        let mut state = self.lock();

        if state.products.values().any(|p| p.sku == input.sku) {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            sku: input.sku,
            description: input.description,
            category_id: input.category_id,
            unit_cost: input.unit_cost,
            min_stock_level: input.min_stock_level.unwrap_or(DEFAULT_MIN_STOCK_LEVEL),
            created_at: now,
            updated_at: now,
        };
        state.products.insert(product.id, product.clone());

        Ok(product)
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.lock().products.get(&id).cloned())
    }

    async fn get_product_by_sku(&self, sku: &str) -> AppResult<Option<Product>> {
        Ok(self
            .lock()
            .products
            .values()
            .find(|p| p.sku == sku)
            .cloned())
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        let mut products: Vec<Product> = self.lock().products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn update_product(&self, id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        let mut state = self.lock();

        let existing = state
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let sku = input.sku.unwrap_or(existing.sku);
        if state.products.values().any(|p| p.sku == sku && p.id != id) {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }

        let updated = Product {
            id,
            name: input.name.unwrap_or(existing.name),
            sku,
            description: input.description.or(existing.description),
            category_id: input.category_id.unwrap_or(existing.category_id),
            unit_cost: input.unit_cost.unwrap_or(existing.unit_cost),
            min_stock_level: input.min_stock_level.unwrap_or(existing.min_stock_level),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        state.products.insert(id, updated.clone());

        Ok(updated)
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.lock();

        let dependents = state
            .records
            .values()
            .filter(|r| r.product_id == id)
            .count()
            + state
                .movements
                .iter()
                .filter(|m| m.product_id == id)
                .count();
        if dependents > 0 {
            return Err(AppError::ReferentialIntegrity {
                resource: "Product".to_string(),
                dependents: format!("{} inventory row(s) or movement(s)", dependents),
            });
        }

        state
            .products
            .remove(&id)
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn get_record(
        &self,
        product_id: Uuid,
        location_id: Uuid,
    ) -> AppResult<Option<InventoryRecord>> {
        Ok(self.lock().records.get(&(product_id, location_id)).cloned())
    }

    async fn list_records(&self) -> AppResult<Vec<InventoryRecord>> {
        let mut records: Vec<InventoryRecord> = self.lock().records.values().cloned().collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    async fn list_records_for_product(
        &self,
        product_id: Uuid,
    ) -> AppResult<Vec<InventoryRecord>> {
        let mut records: Vec<InventoryRecord> = self
            .lock()
            .records
            .values()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    async fn apply_delta(
        &self,
        product_id: Uuid,
        location_id: Uuid,
        delta: i64,
        note: Option<String>,
    ) -> AppResult<(StockMovement, InventoryRecord)> {
        let mut state = self.lock();

        let key = (product_id, location_id);
        let current = state.records.get(&key).map(|r| r.quantity).unwrap_or(0);
        if current + delta < 0 {
            return Err(AppError::InsufficientStock(format!(
                "movement of {} would drive quantity below zero (current: {})",
                delta, current
            )));
        }

        let now = Utc::now();
        let movement = StockMovement {
            id: Uuid::new_v4(),
            product_id,
            location_id,
            quantity: delta,
            note,
            created_at: now,
        };
        state.movements.push(movement.clone());

        let record = match state.records.get_mut(&key) {
            Some(record) => {
                record.quantity += delta;
                record.updated_at = now;
                record.clone()
            }
            None => {
                let record = InventoryRecord {
                    id: Uuid::new_v4(),
                    product_id,
                    location_id,
                    quantity: delta,
                    updated_at: now,
                };
                state.records.insert(key, record.clone());
                record
            }
        };

        Ok((movement, record))
    }

    async fn apply_absolute(
        &self,
        product_id: Uuid,
        location_id: Uuid,
        new_quantity: i64,
        note: Option<String>,
    ) -> AppResult<(InventoryRecord, i64)> {
        let mut state = self.lock();

        let key = (product_id, location_id);
        let current = state.records.get(&key).map(|r| r.quantity);
        let existed = current.is_some();
        let delta = new_quantity - current.unwrap_or(0);

        let now = Utc::now();

        // A zero delta touches updated_at but leaves no ledger entry
        if delta != 0 {
            let default = if existed {
                NOTE_QUANTITY_ADJUSTED
            } else {
                NOTE_QUANTITY_CREATED
            };
            state.movements.push(StockMovement {
                id: Uuid::new_v4(),
                product_id,
                location_id,
                quantity: delta,
                note: Some(note.unwrap_or_else(|| default.to_string())),
                created_at: now,
            });
        }

        let record = match state.records.get_mut(&key) {
            Some(record) => {
                record.quantity = new_quantity;
                record.updated_at = now;
                record.clone()
            }
            None => {
                let record = InventoryRecord {
                    id: Uuid::new_v4(),
                    product_id,
                    location_id,
                    quantity: new_quantity,
                    updated_at: now,
                };
                state.records.insert(key, record.clone());
                record
            }
        };

        Ok((record, delta))
    }

    async fn remove_record(&self, product_id: Uuid, location_id: Uuid) -> AppResult<()> {
        let mut state = self.lock();

        let key = (product_id, location_id);
        let current = state
            .records
            .get(&key)
            .map(|r| r.quantity)
            .ok_or_else(|| AppError::NotFound("Inventory record".to_string()))?;

        state.movements.push(StockMovement {
            id: Uuid::new_v4(),
            product_id,
            location_id,
            quantity: -current,
            note: Some(NOTE_INVENTORY_REMOVED.to_string()),
            created_at: Utc::now(),
        });
        state.records.remove(&key);

        Ok(())
    }

    async fn list_movements(&self) -> AppResult<Vec<StockMovement>> {
        Ok(self.lock().movements.iter().rev().cloned().collect())
    }

    async fn list_recent_movements(&self, limit: i64) -> AppResult<Vec<StockMovement>> {
        Ok(self
            .lock()
            .movements
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn list_movements_for_product(
        &self,
        product_id: Uuid,
    ) -> AppResult<Vec<StockMovement>> {
        Ok(self
            .lock()
            .movements
            .iter()
            .rev()
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn count_movements(&self) -> AppResult<i64> {
        Ok(self.lock().movements.len() as i64)
    }
}
