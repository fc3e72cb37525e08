//! HTTP handlers for inventory management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared::models::{
    CreateInventoryInput, InventoryItem, InventoryRecord, LowStockItem, SetQuantityInput,
};

use crate::error::AppResult;
use crate::services::StockService;
use crate::AppState;

/// List all inventory records with product and location context
pub async fn list_inventory(State(state): State<AppState>) -> AppResult<Json<Vec<InventoryItem>>> {
    let service = StockService::new(state.store);
    let items = service.list_inventory().await?;
    Ok(Json(items))
}

/// Create initial inventory for a (product, location) pair
pub async fn create_inventory(
    State(state): State<AppState>,
    Json(input): Json<CreateInventoryInput>,
) -> AppResult<Json<InventoryRecord>> {
    let service = StockService::new(state.store);
    let record = service
        .create_initial_inventory(input.product_id, input.location_id, input.quantity)
        .await?;
    Ok(Json(record))
}

/// Set the absolute quantity for a pair
pub async fn set_quantity(
    State(state): State<AppState>,
    Path((product_id, location_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<SetQuantityInput>,
) -> AppResult<Json<InventoryRecord>> {
    let service = StockService::new(state.store);
    let record = service
        .set_absolute_quantity(product_id, location_id, input.quantity, input.note)
        .await?;
    Ok(Json(record))
}

/// Remove a pair's inventory record, keeping its ledger history
pub async fn remove_inventory(
    State(state): State<AppState>,
    Path((product_id, location_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<()>> {
    let service = StockService::new(state.store);
    service.remove_inventory(product_id, location_id).await?;
    Ok(Json(()))
}

/// List low- and out-of-stock items, most critical first
pub async fn get_low_stock(State(state): State<AppState>) -> AppResult<Json<Vec<LowStockItem>>> {
    let service = StockService::new(state.store);
    let items = service.low_stock_items().await?;
    Ok(Json(items))
}
