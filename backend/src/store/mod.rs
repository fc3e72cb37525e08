//! Storage contracts for the catalog, stock aggregates, and movement ledger
//!
//! Two implementations satisfy these traits: a PostgreSQL store for
//! production and a map-backed store for tests and lightweight deployments.
//! The backend is chosen once at startup and injected as `Arc<dyn Store>`.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use shared::models::{
    Category, CreateCategoryInput, CreateLocationInput, CreateProductInput, InventoryRecord,
    Location, Product, StockMovement, UpdateCategoryInput, UpdateLocationInput,
    UpdateProductInput,
};

use crate::error::AppResult;

/// CRUD for reference data: categories, locations, products
///
/// Implementations enforce uniqueness (`DuplicateEntry`) on category and
/// location names and product skus, and refuse deletes while dependents
/// exist (`ReferentialIntegrity`).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create_category(&self, input: CreateCategoryInput) -> AppResult<Category>;
    async fn get_category(&self, id: Uuid) -> AppResult<Option<Category>>;
    async fn get_category_by_name(&self, name: &str) -> AppResult<Option<Category>>;
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn update_category(&self, id: Uuid, input: UpdateCategoryInput) -> AppResult<Category>;
    async fn delete_category(&self, id: Uuid) -> AppResult<()>;

    async fn create_location(&self, input: CreateLocationInput) -> AppResult<Location>;
    async fn get_location(&self, id: Uuid) -> AppResult<Option<Location>>;
    async fn get_location_by_name(&self, name: &str) -> AppResult<Option<Location>>;
    async fn list_locations(&self) -> AppResult<Vec<Location>>;
    async fn update_location(&self, id: Uuid, input: UpdateLocationInput) -> AppResult<Location>;
    async fn delete_location(&self, id: Uuid) -> AppResult<()>;

    async fn create_product(&self, input: CreateProductInput) -> AppResult<Product>;
    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>>;
    async fn get_product_by_sku(&self, sku: &str) -> AppResult<Option<Product>>;
    async fn list_products(&self) -> AppResult<Vec<Product>>;
    async fn update_product(&self, id: Uuid, input: UpdateProductInput) -> AppResult<Product>;
    async fn delete_product(&self, id: Uuid) -> AppResult<()>;
}

/// Stock aggregates plus the append-only movement ledger
///
/// The write primitives pair the ledger append with the aggregate change
/// inside one transaction (or one serialized critical section), so the two
/// always move in lockstep: if either write fails, neither commits.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn get_record(
        &self,
        product_id: Uuid,
        location_id: Uuid,
    ) -> AppResult<Option<InventoryRecord>>;
    async fn list_records(&self) -> AppResult<Vec<InventoryRecord>>;
    async fn list_records_for_product(&self, product_id: Uuid)
        -> AppResult<Vec<InventoryRecord>>;

    /// Apply a signed delta to a pair: append the movement, then create the
    /// aggregate row with `quantity = delta` or add the delta to it.
    /// Rejects with `InsufficientStock` when the result would be negative.
    async fn apply_delta(
        &self,
        product_id: Uuid,
        location_id: Uuid,
        delta: i64,
        note: Option<String>,
    ) -> AppResult<(StockMovement, InventoryRecord)>;

    /// Set an absolute quantity on a pair, logging the implied delta.
    /// A zero delta still touches `updated_at` but appends no movement.
    /// Returns the record and the delta that was applied.
    async fn apply_absolute(
        &self,
        product_id: Uuid,
        location_id: Uuid,
        new_quantity: i64,
        note: Option<String>,
    ) -> AppResult<(InventoryRecord, i64)>;

    /// Delete a pair's aggregate row, first appending a compensating
    /// movement of `-current_quantity` so the ledger records the removal.
    async fn remove_record(&self, product_id: Uuid, location_id: Uuid) -> AppResult<()>;

    async fn list_movements(&self) -> AppResult<Vec<StockMovement>>;
    async fn list_recent_movements(&self, limit: i64) -> AppResult<Vec<StockMovement>>;
    async fn list_movements_for_product(&self, product_id: Uuid)
        -> AppResult<Vec<StockMovement>>;
    async fn count_movements(&self) -> AppResult<i64>;
}

/// The composed storage object handed to services
pub trait Store: CatalogStore + InventoryStore {}

impl<T: CatalogStore + InventoryStore> Store for T {}

/// Default note applied when an absolute set creates a pair's first record
pub(crate) const NOTE_QUANTITY_CREATED: &str = "Initial quantity";
/// Default note applied when an absolute set adjusts an existing record
pub(crate) const NOTE_QUANTITY_ADJUSTED: &str = "Quantity adjusted";
/// Note applied to the compensating movement written on removal
pub(crate) const NOTE_INVENTORY_REMOVED: &str = "Inventory removed";
