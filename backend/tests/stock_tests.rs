//! Stock reconciliation engine tests
//!
//! Exercises the engine against the in-memory store: ledger/aggregate
//! consistency, status classification, and the documented edge behaviors.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use shared::models::{
    stock_status, CreateCategoryInput, CreateLocationInput, CreateProductInput, StockStatus,
};
use stocktrack_backend::error::AppError;
use stocktrack_backend::services::{CatalogService, StockService};
use stocktrack_backend::store::{MemoryStore, Store};

/// Create a store seeded with one category, one location, and one product
async fn setup() -> (Arc<dyn Store>, Uuid, Uuid) {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let catalog = CatalogService::new(store.clone());

    let category = catalog
        .create_category(CreateCategoryInput {
            name: "Beverages".to_string(),
            description: None,
        })
        .await
        .unwrap();

    let location = catalog
        .create_location(CreateLocationInput {
            name: "Main Warehouse".to_string(),
            description: None,
        })
        .await
        .unwrap();

    let product = catalog
        .create_product(CreateProductInput {
            name: "Cold Brew Bottle".to_string(),
            sku: "CB-001".to_string(),
            description: None,
            category_id: category.id,
            unit_cost: Decimal::new(450, 2),
            min_stock_level: Some(10),
        })
        .await
        .unwrap();

    (store, product.id, location.id)
}

async fn add_product(store: &Arc<dyn Store>, sku: &str, min_stock_level: i32) -> Uuid {
    let catalog = CatalogService::new(store.clone());
    let category = catalog.list_categories().await.unwrap().remove(0);
    catalog
        .create_product(CreateProductInput {
            name: format!("Product {}", sku),
            sku: sku.to_string(),
            description: None,
            category_id: category.id,
            unit_cost: Decimal::new(100, 2),
            min_stock_level: Some(min_stock_level),
        })
        .await
        .unwrap()
        .id
}

async fn add_location(store: &Arc<dyn Store>, name: &str) -> Uuid {
    let catalog = CatalogService::new(store.clone());
    catalog
        .create_location(CreateLocationInput {
            name: name.to_string(),
            description: None,
        })
        .await
        .unwrap()
        .id
}

/// Sum of all ledger deltas recorded for a pair
async fn ledger_sum(store: &Arc<dyn Store>, product_id: Uuid, location_id: Uuid) -> i64 {
    store
        .list_movements()
        .await
        .unwrap()
        .iter()
        .filter(|m| m.product_id == product_id && m.location_id == location_id)
        .map(|m| m.quantity)
        .sum()
}

mod reconciliation {
    use super::*;

    /// Initial inventory then a sale: aggregate and ledger agree
    #[tokio::test]
    async fn initial_inventory_then_sale() {
        let (store, product_id, location_id) = setup().await;
        let service = StockService::new(store.clone());

        service
            .create_initial_inventory(product_id, location_id, 25)
            .await
            .unwrap();
        service
            .record_movement(product_id, location_id, -5, Some("sale".to_string()))
            .await
            .unwrap();

        let record = store
            .get_record(product_id, location_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.quantity, 20);

        let movements = store.list_movements().await.unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(ledger_sum(&store, product_id, location_id).await, 20);
    }

    /// Absolute set over an existing quantity logs the implied delta
    #[tokio::test]
    async fn absolute_set_logs_the_delta() {
        let (store, product_id, location_id) = setup().await;
        let service = StockService::new(store.clone());

        service
            .create_initial_inventory(product_id, location_id, 8)
            .await
            .unwrap();
        let record = service
            .set_absolute_quantity(product_id, location_id, 12, None)
            .await
            .unwrap();

        assert_eq!(record.quantity, 12);

        let latest = store.list_movements().await.unwrap().remove(0);
        assert_eq!(latest.quantity, 4);
        assert_eq!(ledger_sum(&store, product_id, location_id).await, 12);
    }

    /// A zero-delta absolute set appends nothing to the ledger
    #[tokio::test]
    async fn zero_delta_absolute_set_skips_the_ledger() {
        let (store, product_id, location_id) = setup().await;
        let service = StockService::new(store.clone());

        service
            .create_initial_inventory(product_id, location_id, 8)
            .await
            .unwrap();
        let before = store.count_movements().await.unwrap();

        let record = service
            .set_absolute_quantity(product_id, location_id, 8, None)
            .await
            .unwrap();

        assert_eq!(record.quantity, 8);
        assert_eq!(store.count_movements().await.unwrap(), before);
    }

    /// Removing inventory appends the compensating movement and deletes the row
    #[tokio::test]
    async fn remove_inventory_compensates_and_deletes() {
        let (store, product_id, location_id) = setup().await;
        let other_location = add_location(&store, "Backroom").await;
        let service = StockService::new(store.clone());

        service
            .create_initial_inventory(product_id, location_id, 20)
            .await
            .unwrap();
        service
            .create_initial_inventory(product_id, other_location, 10)
            .await
            .unwrap();

        service
            .remove_inventory(product_id, location_id)
            .await
            .unwrap();

        assert!(store
            .get_record(product_id, location_id)
            .await
            .unwrap()
            .is_none());
        assert_eq!(service.product_total_stock(product_id).await.unwrap(), 10);

        // Ledger keeps the full history for the removed pair
        assert_eq!(ledger_sum(&store, product_id, location_id).await, 0);
        let latest = store.list_movements().await.unwrap().remove(0);
        assert_eq!(latest.quantity, -20);
        assert_eq!(latest.note.as_deref(), Some("Inventory removed"));
    }

    /// Creating initial inventory twice for the same pair is rejected
    #[tokio::test]
    async fn duplicate_initial_inventory_is_rejected() {
        let (store, product_id, location_id) = setup().await;
        let service = StockService::new(store.clone());

        service
            .create_initial_inventory(product_id, location_id, 5)
            .await
            .unwrap();
        let err = service
            .create_initial_inventory(product_id, location_id, 5)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DuplicateEntry(_)));
    }

    /// Movements that would drive the quantity negative are rejected
    #[tokio::test]
    async fn negative_result_is_rejected() {
        let (store, product_id, location_id) = setup().await;
        let service = StockService::new(store.clone());

        service
            .create_initial_inventory(product_id, location_id, 3)
            .await
            .unwrap();
        let err = service
            .record_movement(product_id, location_id, -4, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InsufficientStock(_)));

        // The rejected movement left no trace in either table
        let record = store
            .get_record(product_id, location_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.quantity, 3);
        assert_eq!(ledger_sum(&store, product_id, location_id).await, 3);
    }

    /// A zero movement is meaningless and rejected
    #[tokio::test]
    async fn zero_movement_is_rejected() {
        let (store, product_id, location_id) = setup().await;
        let service = StockService::new(store.clone());

        let err = service
            .record_movement(product_id, location_id, 0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    /// Movements referencing unknown products or locations are rejected
    #[tokio::test]
    async fn unknown_references_are_rejected() {
        let (store, product_id, location_id) = setup().await;
        let service = StockService::new(store.clone());

        let err = service
            .record_movement(Uuid::new_v4(), location_id, 5, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownReference(_)));

        let err = service
            .record_movement(product_id, Uuid::new_v4(), 5, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownReference(_)));
    }

    /// Reading the total twice without writes returns the same value
    #[tokio::test]
    async fn total_stock_reads_are_idempotent() {
        let (store, product_id, location_id) = setup().await;
        let service = StockService::new(store.clone());

        service
            .create_initial_inventory(product_id, location_id, 14)
            .await
            .unwrap();

        let first = service.product_total_stock(product_id).await.unwrap();
        let second = service.product_total_stock(product_id).await.unwrap();
        assert_eq!(first, 14);
        assert_eq!(first, second);
    }

    /// A mixed sequence of relative and absolute writes preserves the
    /// ledger/aggregate invariant
    #[tokio::test]
    async fn mixed_write_sequence_stays_consistent() {
        let (store, product_id, location_id) = setup().await;
        let service = StockService::new(store.clone());

        service
            .create_initial_inventory(product_id, location_id, 10)
            .await
            .unwrap();
        service
            .record_movement(product_id, location_id, 7, None)
            .await
            .unwrap();
        service
            .set_absolute_quantity(product_id, location_id, 4, None)
            .await
            .unwrap();
        service
            .record_movement(product_id, location_id, -4, Some("shrinkage".to_string()))
            .await
            .unwrap();
        service
            .set_absolute_quantity(product_id, location_id, 30, None)
            .await
            .unwrap();

        let record = store
            .get_record(product_id, location_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.quantity, 30);
        assert_eq!(
            ledger_sum(&store, product_id, location_id).await,
            record.quantity
        );
    }
}

mod read_models {
    use super::*;

    /// Low-stock list excludes healthy rows and sorts by criticality
    #[tokio::test]
    async fn low_stock_is_sorted_most_critical_first() {
        let (store, product_id, location_id) = setup().await;
        let service = StockService::new(store.clone());

        let depleted = add_product(&store, "P-OUT", 10).await;
        let at_minimum = add_product(&store, "P-MIN", 5).await;
        let healthy = add_product(&store, "P-OK", 10).await;

        // quantity 2 of min 10 -> ratio 0.2
        service
            .create_initial_inventory(product_id, location_id, 2)
            .await
            .unwrap();
        // quantity 0 -> out of stock, ratio 0.0
        service
            .create_initial_inventory(depleted, location_id, 0)
            .await
            .unwrap();
        // quantity 5 of min 5 -> boundary low stock, ratio 1.0
        service
            .create_initial_inventory(at_minimum, location_id, 5)
            .await
            .unwrap();
        service
            .create_initial_inventory(healthy, location_id, 40)
            .await
            .unwrap();

        let items = service.low_stock_items().await.unwrap();
        let ids: Vec<Uuid> = items.iter().map(|i| i.record.product_id).collect();
        assert_eq!(ids, vec![depleted, product_id, at_minimum]);

        assert_eq!(items[0].status, StockStatus::OutOfStock);
        assert_eq!(items[1].status, StockStatus::LowStock);
        assert_eq!(items[2].status, StockStatus::LowStock);
    }

    /// Dashboard aggregates value and counts from the aggregate rows
    #[tokio::test]
    async fn dashboard_stats_reflect_aggregates_and_ledger() {
        let (store, product_id, location_id) = setup().await;
        let service = StockService::new(store.clone());

        let other = add_product(&store, "P-2", 10).await;

        // Ends at 18 x 4.50 + 3 x 1.00 = 84.00; the second row is low stock
        service
            .create_initial_inventory(product_id, location_id, 20)
            .await
            .unwrap();
        service
            .create_initial_inventory(other, location_id, 3)
            .await
            .unwrap();
        service
            .record_movement(product_id, location_id, -2, None)
            .await
            .unwrap();

        let stats = service.dashboard_stats().await.unwrap();
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.low_stock_items, 1);
        assert_eq!(stats.inventory_value, Decimal::new(8400, 2));
        // All-time ledger count: two initial entries plus one movement
        assert_eq!(stats.recent_movement_count, 3);
    }

    /// Recent movements come back newest first, bounded by the limit
    #[tokio::test]
    async fn recent_movements_are_newest_first() {
        let (store, product_id, location_id) = setup().await;
        let service = StockService::new(store.clone());

        service
            .create_initial_inventory(product_id, location_id, 10)
            .await
            .unwrap();
        for delta in [1i64, 2, 3] {
            service
                .record_movement(product_id, location_id, delta, None)
                .await
                .unwrap();
        }

        let movements = service.recent_movements(2).await.unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].quantity, 3);
        assert_eq!(movements[1].quantity, 2);
    }

    /// Per-location breakdown sums to the product total
    #[tokio::test]
    async fn product_stock_breakdown_sums_locations() {
        let (store, product_id, location_id) = setup().await;
        let other_location = add_location(&store, "Backroom").await;
        let service = StockService::new(store.clone());

        service
            .create_initial_inventory(product_id, location_id, 12)
            .await
            .unwrap();
        service
            .create_initial_inventory(product_id, other_location, 8)
            .await
            .unwrap();

        let stock = service.product_stock(product_id).await.unwrap();
        assert_eq!(stock.total_quantity, 20);
        assert_eq!(stock.by_location.len(), 2);

        let sum: i64 = stock.by_location.iter().map(|l| l.quantity).sum();
        assert_eq!(sum, stock.total_quantity);
    }
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The classification rule is total and consistent at every point
        #[test]
        fn prop_status_classification_is_uniform(
            quantity in -100i64..=200,
            min_stock_level in 0i32..=50
        ) {
            let status = stock_status(quantity, min_stock_level);
            if quantity <= 0 {
                prop_assert_eq!(status, StockStatus::OutOfStock);
            } else if quantity <= i64::from(min_stock_level) {
                prop_assert_eq!(status, StockStatus::LowStock);
            } else {
                prop_assert_eq!(status, StockStatus::InStock);
            }
        }

        /// Accepted movement sequences keep the aggregate equal to the
        /// ledger sum; rejected ones change nothing
        #[test]
        fn prop_ledger_and_aggregate_stay_in_lockstep(
            deltas in prop::collection::vec(-20i64..=50, 1..30)
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            rt.block_on(async {
                let (store, product_id, location_id) = setup().await;
                let service = StockService::new(store.clone());

                let mut expected = 0i64;
                for delta in deltas {
                    if delta == 0 {
                        continue;
                    }
                    match service
                        .record_movement(product_id, location_id, delta, None)
                        .await
                    {
                        Ok(_) => expected += delta,
                        Err(AppError::InsufficientStock(_)) => {
                            assert!(expected + delta < 0);
                        }
                        Err(err) => panic!("unexpected error: {err:?}"),
                    }
                }

                let quantity = store
                    .get_record(product_id, location_id)
                    .await
                    .unwrap()
                    .map(|r| r.quantity)
                    .unwrap_or(0);
                assert_eq!(quantity, expected);
                assert_eq!(ledger_sum(&store, product_id, location_id).await, expected);
                assert!(quantity >= 0);
            });
        }
    }
}
