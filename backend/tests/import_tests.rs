//! Bulk import tests: per-row reconciliation, lazy taxonomy creation,
//! and best-effort error counting

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use shared::models::{CreateCategoryInput, CreateLocationInput, CreateProductInput};
use shared::types::{ImportKind, ImportSummary};
use stocktrack_backend::services::{CatalogService, ImportService, StockService};
use stocktrack_backend::store::{MemoryStore, Store};

fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn setup() -> (Arc<dyn Store>, Uuid) {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let catalog = CatalogService::new(store.clone());

    let category = catalog
        .create_category(CreateCategoryInput {
            name: "Default".to_string(),
            description: None,
        })
        .await
        .unwrap();

    catalog
        .create_product(CreateProductInput {
            name: "Widget".to_string(),
            sku: "X1".to_string(),
            description: None,
            category_id: category.id,
            unit_cost: Decimal::new(500, 2),
            min_stock_level: Some(10),
        })
        .await
        .unwrap();

    (store, category.id)
}

/// An inventory row naming an unknown location creates it on the fly
#[tokio::test]
async fn inventory_import_creates_missing_location() {
    let (store, _category) = setup().await;
    let service = ImportService::new(store.clone());

    let summary = service
        .import_rows(
            ImportKind::Inventory,
            vec![row(&[
                ("sku", "X1"),
                ("location", "New Loc"),
                ("quantity", "10"),
            ])],
        )
        .await
        .unwrap();

    assert_eq!(
        summary,
        ImportSummary {
            imported: 1,
            errors: 0
        }
    );

    let location = store
        .get_location_by_name("New Loc")
        .await
        .unwrap()
        .expect("location should have been created");
    assert!(location.description.is_none());

    let product = store.get_product_by_sku("X1").await.unwrap().unwrap();
    let record = store
        .get_record(product.id, location.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.quantity, 10);

    // The snapshot landed through the ledger, not a bypass write
    let movements = store.list_movements().await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].quantity, 10);
    assert_eq!(movements[0].note.as_deref(), Some("Initial inventory"));
}

/// A snapshot over an existing record sets the absolute quantity
#[tokio::test]
async fn inventory_import_adjusts_existing_record() {
    let (store, _category) = setup().await;
    let catalog = CatalogService::new(store.clone());
    let stock = StockService::new(store.clone());

    let location = catalog
        .create_location(CreateLocationInput {
            name: "Main".to_string(),
            description: None,
        })
        .await
        .unwrap();
    let product = store.get_product_by_sku("X1").await.unwrap().unwrap();
    stock
        .create_initial_inventory(product.id, location.id, 8)
        .await
        .unwrap();

    let service = ImportService::new(store.clone());
    let summary = service
        .import_rows(
            ImportKind::Inventory,
            vec![row(&[
                ("sku", "X1"),
                ("location", "Main"),
                ("quantity", "12"),
            ])],
        )
        .await
        .unwrap();

    assert_eq!(summary.imported, 1);
    assert_eq!(summary.errors, 0);

    let record = store
        .get_record(product.id, location.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.quantity, 12);

    let latest = store.list_movements().await.unwrap().remove(0);
    assert_eq!(latest.quantity, 4);
    assert_eq!(latest.note.as_deref(), Some("Inventory import"));
}

/// Bad rows are counted and skipped; good rows still land
#[tokio::test]
async fn import_is_best_effort_per_row() {
    let (store, _category) = setup().await;
    let service = ImportService::new(store.clone());

    let summary = service
        .import_rows(
            ImportKind::Inventory,
            vec![
                // Unknown sku
                row(&[("sku", "MISSING"), ("location", "Main"), ("quantity", "1")]),
                // Malformed quantity
                row(&[("sku", "X1"), ("location", "Main"), ("quantity", "many")]),
                // Valid
                row(&[("sku", "X1"), ("location", "Main"), ("quantity", "7")]),
                // Negative quantity
                row(&[("sku", "X1"), ("location", "Main"), ("quantity", "-2")]),
            ],
        )
        .await
        .unwrap();

    assert_eq!(
        summary,
        ImportSummary {
            imported: 1,
            errors: 3
        }
    );

    let product = store.get_product_by_sku("X1").await.unwrap().unwrap();
    let location = store.get_location_by_name("Main").await.unwrap().unwrap();
    let record = store
        .get_record(product.id, location.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.quantity, 7);
}

/// Product imports resolve or create their category by exact name
#[tokio::test]
async fn product_import_creates_missing_category() {
    let (store, _category) = setup().await;
    let service = ImportService::new(store.clone());

    let summary = service
        .import_rows(
            ImportKind::Products,
            vec![
                row(&[
                    ("name", "Hammer"),
                    ("sku", "H-1"),
                    ("category", "Tools"),
                    ("unit_cost", "12.00"),
                    ("min_stock_level", "4"),
                ]),
                row(&[
                    ("name", "Chisel"),
                    ("sku", "C-1"),
                    ("category", "Tools"),
                    ("unit_cost", "7.50"),
                ]),
            ],
        )
        .await
        .unwrap();

    assert_eq!(summary.imported, 2);
    assert_eq!(summary.errors, 0);

    let category = store
        .get_category_by_name("Tools")
        .await
        .unwrap()
        .expect("category should have been created");

    let hammer = store.get_product_by_sku("H-1").await.unwrap().unwrap();
    assert_eq!(hammer.category_id, category.id);
    assert_eq!(hammer.min_stock_level, 4);

    let chisel = store.get_product_by_sku("C-1").await.unwrap().unwrap();
    assert_eq!(chisel.category_id, category.id);
}

/// Duplicate skus in a product import are per-row errors
#[tokio::test]
async fn product_import_counts_duplicate_sku_as_error() {
    let (store, _category) = setup().await;
    let service = ImportService::new(store.clone());

    let summary = service
        .import_rows(
            ImportKind::Products,
            vec![
                // Collides with the seeded product
                row(&[
                    ("name", "Widget Again"),
                    ("sku", "X1"),
                    ("category", "Default"),
                    ("unit_cost", "1.00"),
                ]),
                row(&[
                    ("name", "Fresh"),
                    ("sku", "F-1"),
                    ("category", "Default"),
                    ("unit_cost", "2.00"),
                ]),
            ],
        )
        .await
        .unwrap();

    assert_eq!(
        summary,
        ImportSummary {
            imported: 1,
            errors: 1
        }
    );
    assert!(store.get_product_by_sku("F-1").await.unwrap().is_some());
}

/// An empty batch reports an empty summary
#[tokio::test]
async fn empty_import_is_a_noop() {
    let (store, _category) = setup().await;
    let service = ImportService::new(store);

    let summary = service
        .import_rows(ImportKind::Products, Vec::new())
        .await
        .unwrap();

    assert_eq!(summary, ImportSummary::default());
}
