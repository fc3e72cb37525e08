//! Route definitions for the StockTrack platform

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Catalog taxonomies
        .nest("/categories", category_routes())
        .nest("/locations", location_routes())
        // Product catalog
        .nest("/products", product_routes())
        // Stock aggregates
        .nest("/inventory", inventory_routes())
        // Movement ledger
        .nest("/movements", movement_routes())
        // Dashboard and reports
        .nest("/reports", report_routes())
        // CSV import/export
        .route("/import/:kind", post(handlers::import_csv))
        .route("/export/:kind", get(handlers::export_csv))
}

/// Category management routes
fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
}

/// Location management routes
fn location_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_locations).post(handlers::create_location),
        )
        .route(
            "/:location_id",
            get(handlers::get_location)
                .put(handlers::update_location)
                .delete(handlers::delete_location),
        )
}

/// Product management routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:product_id/stock", get(handlers::get_product_stock))
        .route("/:product_id/movements", get(handlers::get_product_movements))
}

/// Inventory management routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_inventory).post(handlers::create_inventory),
        )
        .route("/low-stock", get(handlers::get_low_stock))
        .route(
            "/:product_id/:location_id",
            put(handlers::set_quantity).delete(handlers::remove_inventory),
        )
}

/// Movement ledger routes
fn movement_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::list_movements).post(handlers::record_movement),
    )
}

/// Report routes
fn report_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(handlers::get_dashboard_stats))
}
