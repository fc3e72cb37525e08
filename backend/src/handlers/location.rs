//! HTTP handlers for location management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared::models::{CreateLocationInput, Location, UpdateLocationInput};

use crate::error::AppResult;
use crate::services::CatalogService;
use crate::AppState;

/// List all locations
pub async fn list_locations(State(state): State<AppState>) -> AppResult<Json<Vec<Location>>> {
    let service = CatalogService::new(state.store);
    let locations = service.list_locations().await?;
    Ok(Json(locations))
}

/// Create a location
pub async fn create_location(
    State(state): State<AppState>,
    Json(input): Json<CreateLocationInput>,
) -> AppResult<Json<Location>> {
    let service = CatalogService::new(state.store);
    let location = service.create_location(input).await?;
    Ok(Json(location))
}

/// Get a location by ID
pub async fn get_location(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> AppResult<Json<Location>> {
    let service = CatalogService::new(state.store);
    let location = service.get_location(location_id).await?;
    Ok(Json(location))
}

/// Update a location
pub async fn update_location(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
    Json(input): Json<UpdateLocationInput>,
) -> AppResult<Json<Location>> {
    let service = CatalogService::new(state.store);
    let location = service.update_location(location_id, input).await?;
    Ok(Json(location))
}

/// Delete a location; fails while inventory or movements reference it
pub async fn delete_location(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = CatalogService::new(state.store);
    service.delete_location(location_id).await?;
    Ok(Json(()))
}
