//! HTTP handlers for CSV import and export

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use shared::types::{ImportKind, ImportSummary};

use crate::error::{AppError, AppResult};
use crate::services::{CatalogService, ImportService, StockService};
use crate::AppState;

fn parse_kind(kind: &str) -> AppResult<ImportKind> {
    kind.parse().map_err(|message| AppError::Validation {
        field: "kind".to_string(),
        message,
    })
}

/// Import a CSV body of the given kind (products or inventory)
pub async fn import_csv(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    body: String,
) -> AppResult<Json<ImportSummary>> {
    let kind = parse_kind(&kind)?;
    let rows = parse_csv_rows(&body)?;

    let service = ImportService::new(state.store);
    let summary = service.import_rows(kind, rows).await?;
    Ok(Json(summary))
}

/// Export the catalog or the inventory view as CSV
pub async fn export_csv(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;

    let csv = match kind {
        ImportKind::Products => export_products(state).await?,
        ImportKind::Inventory => export_inventory(state).await?,
    };

    Ok(([(header::CONTENT_TYPE, "text/csv")], csv))
}

/// Parse a CSV body into one string mapping per record, keyed by header
fn parse_csv_rows(body: &str) -> AppResult<Vec<HashMap<String, String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::Validation {
            field: "body".to_string(),
            message: format!("invalid CSV: {}", e),
        })?
        .clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::Validation {
            field: "body".to_string(),
            message: format!("invalid CSV: {}", e),
        })?;
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.to_string(), value.to_string()))
                .collect(),
        );
    }

    Ok(rows)
}

async fn export_products(state: AppState) -> AppResult<String> {
    let service = CatalogService::new(state.store);
    let products = service.list_products().await?;
    let categories: HashMap<Uuid, String> = service
        .list_categories()
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let mut writer = csv::Writer::from_writer(vec![]);
    writer
        .write_record([
            "name",
            "sku",
            "description",
            "category",
            "unit_cost",
            "min_stock_level",
        ])
        .map_err(anyhow::Error::from)?;

    for product in products {
        writer
            .write_record(&[
                product.name,
                product.sku,
                product.description.unwrap_or_default(),
                categories
                    .get(&product.category_id)
                    .cloned()
                    .unwrap_or_default(),
                product.unit_cost.to_string(),
                product.min_stock_level.to_string(),
            ])
            .map_err(anyhow::Error::from)?;
    }

    finish_csv(writer)
}

async fn export_inventory(state: AppState) -> AppResult<String> {
    let service = StockService::new(state.store);
    let items = service.list_inventory().await?;

    let mut writer = csv::Writer::from_writer(vec![]);
    writer
        .write_record(["sku", "product", "location", "quantity", "status"])
        .map_err(anyhow::Error::from)?;

    for item in items {
        writer
            .write_record(&[
                item.sku,
                item.product_name,
                item.location_name,
                item.record.quantity.to_string(),
                item.status.as_str().to_string(),
            ])
            .map_err(anyhow::Error::from)?;
    }

    finish_csv(writer)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> AppResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(anyhow::Error::new(e)))
}
