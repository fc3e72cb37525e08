//! HTTP handlers for category management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared::models::{Category, CreateCategoryInput, UpdateCategoryInput};

use crate::error::AppResult;
use crate::services::CatalogService;
use crate::AppState;

/// List all categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let service = CatalogService::new(state.store);
    let categories = service.list_categories().await?;
    Ok(Json(categories))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<Json<Category>> {
    let service = CatalogService::new(state.store);
    let category = service.create_category(input).await?;
    Ok(Json(category))
}

/// Get a category by ID
pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<Category>> {
    let service = CatalogService::new(state.store);
    let category = service.get_category(category_id).await?;
    Ok(Json(category))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<Json<Category>> {
    let service = CatalogService::new(state.store);
    let category = service.update_category(category_id, input).await?;
    Ok(Json(category))
}

/// Delete a category; fails while products still reference it
pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = CatalogService::new(state.store);
    service.delete_category(category_id).await?;
    Ok(Json(()))
}
