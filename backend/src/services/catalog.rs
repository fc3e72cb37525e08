//! Catalog service for category, location, and product management

use std::sync::Arc;

use uuid::Uuid;

use rust_decimal::Decimal;
use shared::models::{
    Category, CreateCategoryInput, CreateLocationInput, CreateProductInput, Location, Product,
    UpdateCategoryInput, UpdateLocationInput, UpdateProductInput,
};

use crate::error::{AppError, AppResult};
use crate::store::Store;

/// Catalog service for reference data
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

fn require_non_empty(field: &'static str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation {
            field: field.to_string(),
            message: format!("{} cannot be empty", field),
        });
    }
    Ok(())
}

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<Category> {
        require_non_empty("name", &input.name)?;
        self.store.create_category(input).await
    }

    pub async fn get_category(&self, id: Uuid) -> AppResult<Category> {
        self.store
            .get_category(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.store.list_categories().await
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> AppResult<Category> {
        if let Some(name) = &input.name {
            require_non_empty("name", name)?;
        }
        self.store.update_category(id, input).await
    }

    pub async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        self.store.delete_category(id).await
    }

    pub async fn create_location(&self, input: CreateLocationInput) -> AppResult<Location> {
        require_non_empty("name", &input.name)?;
        self.store.create_location(input).await
    }

    pub async fn get_location(&self, id: Uuid) -> AppResult<Location> {
        self.store
            .get_location(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Location".to_string()))
    }

    pub async fn list_locations(&self) -> AppResult<Vec<Location>> {
        self.store.list_locations().await
    }

    pub async fn update_location(
        &self,
        id: Uuid,
        input: UpdateLocationInput,
    ) -> AppResult<Location> {
        if let Some(name) = &input.name {
            require_non_empty("name", name)?;
        }
        self.store.update_location(id, input).await
    }

    pub async fn delete_location(&self, id: Uuid) -> AppResult<()> {
        self.store.delete_location(id).await
    }

    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        require_non_empty("name", &input.name)?;
        require_non_empty("sku", &input.sku)?;
        validate_product_numbers(Some(input.unit_cost), input.min_stock_level)?;

        if self.store.get_category(input.category_id).await?.is_none() {
            return Err(AppError::UnknownReference("Category".to_string()));
        }

        self.store.create_product(input).await
    }

    pub async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        self.store
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    pub async fn get_product_by_sku(&self, sku: &str) -> AppResult<Product> {
        self.store
            .get_product_by_sku(sku)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.store.list_products().await
    }

    pub async fn update_product(&self, id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        if let Some(name) = &input.name {
            require_non_empty("name", name)?;
        }
        if let Some(sku) = &input.sku {
            require_non_empty("sku", sku)?;
        }
        validate_product_numbers(input.unit_cost, input.min_stock_level)?;

        if let Some(category_id) = input.category_id {
            if self.store.get_category(category_id).await?.is_none() {
                return Err(AppError::UnknownReference("Category".to_string()));
            }
        }

        self.store.update_product(id, input).await
    }

    pub async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        self.store.delete_product(id).await
    }
}

fn validate_product_numbers(
    unit_cost: Option<Decimal>,
    min_stock_level: Option<i32>,
) -> AppResult<()> {
    if let Some(cost) = unit_cost {
        if cost < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "unit_cost".to_string(),
                message: "Unit cost cannot be negative".to_string(),
            });
        }
    }
    if let Some(level) = min_stock_level {
        if level < 0 {
            return Err(AppError::Validation {
                field: "min_stock_level".to_string(),
                message: "Minimum stock level cannot be negative".to_string(),
            });
        }
    }
    Ok(())
}
