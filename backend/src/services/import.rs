//! Bulk import of products and inventory snapshots
//!
//! Imports are best-effort and per-row: a row that fails validation or
//! references missing data is counted and skipped, and the loop continues.
//! The import call itself never fails because of a single bad row.

use std::collections::HashMap;
use std::sync::Arc;

use shared::models::{CreateCategoryInput, CreateLocationInput, CreateProductInput};
use shared::types::{ImportKind, ImportSummary};
use shared::validation::{validate_inventory_row, validate_product_row};

use crate::error::{AppError, AppResult};
use crate::services::stock::StockService;
use crate::store::Store;

/// Note attached to movements created by snapshot imports over existing rows
const NOTE_INVENTORY_IMPORT: &str = "Inventory import";

/// Import service for bulk CSV reconciliation
#[derive(Clone)]
pub struct ImportService {
    store: Arc<dyn Store>,
    stock: StockService,
}

impl ImportService {
    /// Create a new ImportService instance
    pub fn new(store: Arc<dyn Store>) -> Self {
        let stock = StockService::new(store.clone());
        Self { store, stock }
    }

    /// Import a batch of raw rows of the given kind
    ///
    /// Rows run sequentially; each row is its own unit of work.
    pub async fn import_rows(
        &self,
        kind: ImportKind,
        rows: Vec<HashMap<String, String>>,
    ) -> AppResult<ImportSummary> {
        let mut summary = ImportSummary::default();

        for (index, row) in rows.iter().enumerate() {
            let outcome = match kind {
                ImportKind::Products => self.import_product_row(row).await,
                ImportKind::Inventory => self.import_inventory_row(row).await,
            };

            match outcome {
                Ok(()) => summary.imported += 1,
                Err(err) => {
                    tracing::warn!("{} import: row {} skipped: {}", kind.as_str(), index + 1, err);
                    summary.errors += 1;
                }
            }
        }

        tracing::info!(
            kind = kind.as_str(),
            imported = summary.imported,
            errors = summary.errors,
            "bulk import finished"
        );

        Ok(summary)
    }

    async fn import_product_row(&self, row: &HashMap<String, String>) -> AppResult<()> {
        let parsed = validate_product_row(row).map_err(|message| AppError::Validation {
            field: "row".to_string(),
            message,
        })?;

        let category = match self.store.get_category_by_name(&parsed.category_name).await? {
            Some(category) => category,
            None => {
                self.store
                    .create_category(CreateCategoryInput {
                        name: parsed.category_name.clone(),
                        description: None,
                    })
                    .await?
            }
        };

        self.store
            .create_product(CreateProductInput {
                name: parsed.name,
                sku: parsed.sku,
                description: parsed.description,
                category_id: category.id,
                unit_cost: parsed.unit_cost,
                min_stock_level: Some(parsed.min_stock_level),
            })
            .await?;

        Ok(())
    }

    async fn import_inventory_row(&self, row: &HashMap<String, String>) -> AppResult<()> {
        let parsed = validate_inventory_row(row).map_err(|message| AppError::Validation {
            field: "row".to_string(),
            message,
        })?;

        let product = self
            .store
            .get_product_by_sku(&parsed.sku)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product with sku '{}'", parsed.sku)))?;

        let location = match self.store.get_location_by_name(&parsed.location_name).await? {
            Some(location) => location,
            None => {
                self.store
                    .create_location(CreateLocationInput {
                        name: parsed.location_name.clone(),
                        description: None,
                    })
                    .await?
            }
        };

        // First snapshot for a pair creates the record; later snapshots set
        // the absolute quantity and log the implied delta
        if self.store.get_record(product.id, location.id).await?.is_some() {
            self.stock
                .set_absolute_quantity(
                    product.id,
                    location.id,
                    parsed.quantity,
                    Some(NOTE_INVENTORY_IMPORT.to_string()),
                )
                .await?;
        } else {
            self.stock
                .create_initial_inventory(product.id, location.id, parsed.quantity)
                .await?;
        }

        Ok(())
    }
}
