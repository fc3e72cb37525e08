//! HTTP handlers for product management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared::models::{
    CreateProductInput, Product, ProductStock, StockMovement, UpdateProductInput,
};

use crate::error::AppResult;
use crate::services::{CatalogService, StockService};
use crate::AppState;

/// List all products
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let service = CatalogService::new(state.store);
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.store);
    let product = service.create_product(input).await?;
    Ok(Json(product))
}

/// Get a product by ID
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.store);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.store);
    let product = service.update_product(product_id, input).await?;
    Ok(Json(product))
}

/// Delete a product; fails while inventory or movements reference it
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = CatalogService::new(state.store);
    service.delete_product(product_id).await?;
    Ok(Json(()))
}

/// Get a product's total stock with its per-location breakdown
pub async fn get_product_stock(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductStock>> {
    let service = StockService::new(state.store);
    let stock = service.product_stock(product_id).await?;
    Ok(Json(stock))
}

/// Get a product's movement history
pub async fn get_product_movements(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = StockService::new(state.store);
    let movements = service.movements_for_product(product_id).await?;
    Ok(Json(movements))
}
