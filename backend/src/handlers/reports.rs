//! HTTP handlers for dashboard and report endpoints

use axum::{extract::State, Json};

use shared::models::DashboardStats;

use crate::error::AppResult;
use crate::services::StockService;
use crate::AppState;

/// Get dashboard statistics
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
) -> AppResult<Json<DashboardStats>> {
    let service = StockService::new(state.store);
    let stats = service.dashboard_stats().await?;
    Ok(Json(stats))
}
