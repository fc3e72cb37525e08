//! HTTP handlers for stock-movement endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use shared::models::{RecordMovementInput, StockMovement};

use crate::error::AppResult;
use crate::services::StockService;
use crate::AppState;

const DEFAULT_MOVEMENT_LIMIT: i64 = 50;

/// Query parameters for listing movements
#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    pub limit: Option<i64>,
}

/// Record a stock movement
pub async fn record_movement(
    State(state): State<AppState>,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<Json<StockMovement>> {
    let service = StockService::new(state.store);
    let movement = service
        .record_movement(input.product_id, input.location_id, input.quantity, input.note)
        .await?;
    Ok(Json(movement))
}

/// List recent movements, newest first
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = StockService::new(state.store);
    let movements = service
        .recent_movements(query.limit.unwrap_or(DEFAULT_MOVEMENT_LIMIT))
        .await?;
    Ok(Json(movements))
}
