//! PostgreSQL-backed store
//!
//! All write primitives that touch both the ledger and an aggregate row run
//! inside a single transaction with a `FOR UPDATE` row lock on the pair, so
//! concurrent adjustments serialize and the two tables commit in lockstep.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::{
    Category, CreateCategoryInput, CreateLocationInput, CreateProductInput, InventoryRecord,
    Location, Product, StockMovement, UpdateCategoryInput, UpdateLocationInput,
    UpdateProductInput,
};

use super::{
    CatalogStore, InventoryStore, NOTE_INVENTORY_REMOVED, NOTE_QUANTITY_ADJUSTED,
    NOTE_QUANTITY_CREATED,
};
use crate::error::{AppError, AppResult};

/// PostgreSQL store over a sqlx connection pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Row for category queries
#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Category {
            id: r.id,
            name: r.name,
            description: r.description,
            created_at: r.created_at,
        }
    }
}

/// Row for location queries
#[derive(Debug, FromRow)]
struct LocationRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(r: LocationRow) -> Self {
        Location {
            id: r.id,
            name: r.name,
            description: r.description,
            created_at: r.created_at,
        }
    }
}

/// Row for product queries
#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    sku: String,
    description: Option<String>,
    category_id: Uuid,
    unit_cost: Decimal,
    min_stock_level: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            id: r.id,
            name: r.name,
            sku: r.sku,
            description: r.description,
            category_id: r.category_id,
            unit_cost: r.unit_cost,
            min_stock_level: r.min_stock_level,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Row for aggregate queries
#[derive(Debug, FromRow)]
struct InventoryRow {
    id: Uuid,
    product_id: Uuid,
    location_id: Uuid,
    quantity: i64,
    updated_at: DateTime<Utc>,
}

impl From<InventoryRow> for InventoryRecord {
    fn from(r: InventoryRow) -> Self {
        InventoryRecord {
            id: r.id,
            product_id: r.product_id,
            location_id: r.location_id,
            quantity: r.quantity,
            updated_at: r.updated_at,
        }
    }
}

/// Row for ledger queries
#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    product_id: Uuid,
    location_id: Uuid,
    quantity: i64,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<MovementRow> for StockMovement {
    fn from(r: MovementRow) -> Self {
        StockMovement {
            id: r.id,
            product_id: r.product_id,
            location_id: r.location_id,
            quantity: r.quantity,
            note: r.note,
            created_at: r.created_at,
        }
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn create_category(&self, input: CreateCategoryInput) -> AppResult<Category> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1)",
        )
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("category name".to_string()));
        }

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn get_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn get_category_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at FROM categories WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_category(&self, id: Uuid, input: UpdateCategoryInput) -> AppResult<Category> {
        let existing = self
            .get_category(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);

        let collides = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1 AND id <> $2)",
        )
        .bind(&name)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if collides {
            return Err(AppError::DuplicateEntry("category name".to_string()));
        }

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE categories
            SET name = $1, description = $2
            WHERE id = $3
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(&name)
        .bind(&description)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let product_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE category_id = $1",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if product_count > 0 {
            return Err(AppError::ReferentialIntegrity {
                resource: "Category".to_string(),
                dependents: format!("{} product(s)", product_count),
            });
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        Ok(())
    }

    async fn create_location(&self, input: CreateLocationInput) -> AppResult<Location> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM locations WHERE name = $1)",
        )
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("location name".to_string()));
        }

        let row = sqlx::query_as::<_, LocationRow>(
            r#"
            INSERT INTO locations (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn get_location(&self, id: Uuid) -> AppResult<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(
            "SELECT id, name, description, created_at FROM locations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn get_location_by_name(&self, name: &str) -> AppResult<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(
            "SELECT id, name, description, created_at FROM locations WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_locations(&self) -> AppResult<Vec<Location>> {
        let rows = sqlx::query_as::<_, LocationRow>(
            "SELECT id, name, description, created_at FROM locations ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_location(&self, id: Uuid, input: UpdateLocationInput) -> AppResult<Location> {
        let existing = self
            .get_location(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Location".to_string()))?;

        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);

        let collides = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM locations WHERE name = $1 AND id <> $2)",
        )
        .bind(&name)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if collides {
            return Err(AppError::DuplicateEntry("location name".to_string()));
        }

        let row = sqlx::query_as::<_, LocationRow>(
            r#"
            UPDATE locations
            SET name = $1, description = $2
            WHERE id = $3
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(&name)
        .bind(&description)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn delete_location(&self, id: Uuid) -> AppResult<()> {
        let dependents = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT (SELECT COUNT(*) FROM inventory WHERE location_id = $1)
                 + (SELECT COUNT(*) FROM stock_movements WHERE location_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if dependents > 0 {
            return Err(AppError::ReferentialIntegrity {
                resource: "Location".to_string(),
                dependents: format!("{} inventory row(s) or movement(s)", dependents),
            });
        }

        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Location".to_string()));
        }

        Ok(())
    }

    async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)")
                .bind(&input.sku)
                .fetch_one(&self.db)
                .await?;

        if exists {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }

        let min_stock_level = input
            .min_stock_level
            .unwrap_or(shared::models::DEFAULT_MIN_STOCK_LEVEL);

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (name, sku, description, category_id, unit_cost, min_stock_level)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, sku, description, category_id, unit_cost, min_stock_level,
                      created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.sku)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.unit_cost)
        .bind(min_stock_level)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, sku, description, category_id, unit_cost, min_stock_level,
                   created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn get_product_by_sku(&self, sku: &str) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, sku, description, category_id, unit_cost, min_stock_level,
                   created_at, updated_at
            FROM products
            WHERE sku = $1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, sku, description, category_id, unit_cost, min_stock_level,
                   created_at, updated_at
            FROM products
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_product(&self, id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        let existing = self
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let name = input.name.unwrap_or(existing.name);
        let sku = input.sku.unwrap_or(existing.sku);
        let description = input.description.or(existing.description);
        let category_id = input.category_id.unwrap_or(existing.category_id);
        let unit_cost = input.unit_cost.unwrap_or(existing.unit_cost);
        let min_stock_level = input.min_stock_level.unwrap_or(existing.min_stock_level);

        let collides = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1 AND id <> $2)",
        )
        .bind(&sku)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if collides {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET name = $1, sku = $2, description = $3, category_id = $4,
                unit_cost = $5, min_stock_level = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING id, name, sku, description, category_id, unit_cost, min_stock_level,
                      created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&sku)
        .bind(&description)
        .bind(category_id)
        .bind(unit_cost)
        .bind(min_stock_level)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        let dependents = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT (SELECT COUNT(*) FROM inventory WHERE product_id = $1)
                 + (SELECT COUNT(*) FROM stock_movements WHERE product_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if dependents > 0 {
            return Err(AppError::ReferentialIntegrity {
                resource: "Product".to_string(),
                dependents: format!("{} inventory row(s) or movement(s)", dependents),
            });
        }

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn get_record(
        &self,
        product_id: Uuid,
        location_id: Uuid,
    ) -> AppResult<Option<InventoryRecord>> {
        let row = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT id, product_id, location_id, quantity, updated_at
            FROM inventory
            WHERE product_id = $1 AND location_id = $2
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_records(&self) -> AppResult<Vec<InventoryRecord>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT id, product_id, location_id, quantity, updated_at
            FROM inventory
            ORDER BY updated_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_records_for_product(
        &self,
        product_id: Uuid,
    ) -> AppResult<Vec<InventoryRecord>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT id, product_id, location_id, quantity, updated_at
            FROM inventory
            WHERE product_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn apply_delta(
        &self,
        product_id: Uuid,
        location_id: Uuid,
        delta: i64,
        note: Option<String>,
    ) -> AppResult<(StockMovement, InventoryRecord)> {
        let mut tx = self.db.begin().await?;

        // Row-lock the pair so concurrent writers serialize
        let current = sqlx::query_scalar::<_, i64>(
            "SELECT quantity FROM inventory WHERE product_id = $1 AND location_id = $2 FOR UPDATE",
        )
        .bind(product_id)
        .bind(location_id)
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(0);

        if current + delta < 0 {
            return Err(AppError::InsufficientStock(format!(
                "movement of {} would drive quantity below zero (current: {})",
                delta, current
            )));
        }

        let movement = sqlx::query_as::<_, MovementRow>(
            r#"
            INSERT INTO stock_movements (product_id, location_id, quantity, note)
            VALUES ($1, $2, $3, $4)
            RETURNING id, product_id, location_id, quantity, note, created_at
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .bind(delta)
        .bind(&note)
        .fetch_one(&mut *tx)
        .await?;

        let record = sqlx::query_as::<_, InventoryRow>(
            r#"
            INSERT INTO inventory (product_id, location_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (product_id, location_id)
            DO UPDATE SET quantity = inventory.quantity + EXCLUDED.quantity, updated_at = NOW()
            RETURNING id, product_id, location_id, quantity, updated_at
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((movement.into(), record.into()))
    }

    async fn apply_absolute(
        &self,
        product_id: Uuid,
        location_id: Uuid,
        new_quantity: i64,
        note: Option<String>,
    ) -> AppResult<(InventoryRecord, i64)> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, i64>(
            "SELECT quantity FROM inventory WHERE product_id = $1 AND location_id = $2 FOR UPDATE",
        )
        .bind(product_id)
        .bind(location_id)
        .fetch_optional(&mut *tx)
        .await?;

        let existed = current.is_some();
        let delta = new_quantity - current.unwrap_or(0);

        // A zero delta touches updated_at but leaves no ledger entry
        if delta != 0 {
            let default = if existed {
                NOTE_QUANTITY_ADJUSTED
            } else {
                NOTE_QUANTITY_CREATED
            };
            let note = note.unwrap_or_else(|| default.to_string());

            sqlx::query(
                r#"
                INSERT INTO stock_movements (product_id, location_id, quantity, note)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(product_id)
            .bind(location_id)
            .bind(delta)
            .bind(&note)
            .execute(&mut *tx)
            .await?;
        }

        let record = sqlx::query_as::<_, InventoryRow>(
            r#"
            INSERT INTO inventory (product_id, location_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (product_id, location_id)
            DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = NOW()
            RETURNING id, product_id, location_id, quantity, updated_at
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .bind(new_quantity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((record.into(), delta))
    }

    async fn remove_record(&self, product_id: Uuid, location_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, i64>(
            "SELECT quantity FROM inventory WHERE product_id = $1 AND location_id = $2 FOR UPDATE",
        )
        .bind(product_id)
        .bind(location_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory record".to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO stock_movements (product_id, location_id, quantity, note)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .bind(-current)
        .bind(NOTE_INVENTORY_REMOVED)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM inventory WHERE product_id = $1 AND location_id = $2")
            .bind(product_id)
            .bind(location_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn list_movements(&self) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, product_id, location_id, quantity, note, created_at
            FROM stock_movements
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_recent_movements(&self, limit: i64) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, product_id, location_id, quantity, note, created_at
            FROM stock_movements
            ORDER BY created_at DESC, seq DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_movements_for_product(
        &self,
        product_id: Uuid,
    ) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, product_id, location_id, quantity, note, created_at
            FROM stock_movements
            WHERE product_id = $1
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_movements(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stock_movements")
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }
}
