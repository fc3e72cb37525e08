//! Validation for bulk-import rows
//!
//! Import rows arrive as raw string mappings (one per CSV record). Each
//! validator checks required fields, parses numerics, and produces a typed
//! row, so the import loop only ever sees well-formed data.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::DEFAULT_MIN_STOCK_LEVEL;
use crate::types::{InventoryImportRow, ProductImportRow};

/// Fetch a required field, trimmed; empty counts as missing
fn required<'a>(row: &'a HashMap<String, String>, field: &str) -> Result<&'a str, String> {
    match row.get(field).map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(format!("missing required field '{}'", field)),
    }
}

/// Fetch an optional field, trimmed; empty becomes None
fn optional(row: &HashMap<String, String>, field: &str) -> Option<String> {
    row.get(field)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validate a raw product row: name, sku, category, unit_cost, and an
/// optional min_stock_level
pub fn validate_product_row(row: &HashMap<String, String>) -> Result<ProductImportRow, String> {
    let name = required(row, "name")?.to_string();
    let sku = required(row, "sku")?.to_string();
    let category_name = required(row, "category")?.to_string();

    let unit_cost: Decimal = required(row, "unit_cost")?
        .parse()
        .map_err(|_| "unit_cost must be a number".to_string())?;
    if unit_cost < Decimal::ZERO {
        return Err("unit_cost cannot be negative".to_string());
    }

    let min_stock_level = match optional(row, "min_stock_level") {
        Some(raw) => {
            let level: i32 = raw
                .parse()
                .map_err(|_| "min_stock_level must be an integer".to_string())?;
            if level < 0 {
                return Err("min_stock_level cannot be negative".to_string());
            }
            level
        }
        None => DEFAULT_MIN_STOCK_LEVEL,
    };

    Ok(ProductImportRow {
        name,
        sku,
        description: optional(row, "description"),
        category_name,
        unit_cost,
        min_stock_level,
    })
}

/// Validate a raw inventory snapshot row: sku, location, quantity
pub fn validate_inventory_row(row: &HashMap<String, String>) -> Result<InventoryImportRow, String> {
    let sku = required(row, "sku")?.to_string();
    let location_name = required(row, "location")?.to_string();

    let quantity: i64 = required(row, "quantity")?
        .parse()
        .map_err(|_| "quantity must be an integer".to_string())?;
    if quantity < 0 {
        return Err("quantity cannot be negative".to_string());
    }

    Ok(InventoryImportRow {
        sku,
        location_name,
        quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn product_row_parses_with_default_min_stock() {
        let parsed = validate_product_row(&row(&[
            ("name", "Widget"),
            ("sku", "W-1"),
            ("category", "Widgets"),
            ("unit_cost", "2.50"),
        ]))
        .unwrap();

        assert_eq!(parsed.sku, "W-1");
        assert_eq!(parsed.min_stock_level, DEFAULT_MIN_STOCK_LEVEL);
        assert!(parsed.description.is_none());
    }

    #[test]
    fn product_row_rejects_missing_sku() {
        let err = validate_product_row(&row(&[
            ("name", "Widget"),
            ("category", "Widgets"),
            ("unit_cost", "2.50"),
        ]))
        .unwrap_err();
        assert!(err.contains("sku"));
    }

    #[test]
    fn product_row_rejects_negative_cost() {
        let err = validate_product_row(&row(&[
            ("name", "Widget"),
            ("sku", "W-1"),
            ("category", "Widgets"),
            ("unit_cost", "-1"),
        ]))
        .unwrap_err();
        assert!(err.contains("negative"));
    }

    #[test]
    fn inventory_row_rejects_non_numeric_quantity() {
        let err = validate_inventory_row(&row(&[
            ("sku", "W-1"),
            ("location", "Main"),
            ("quantity", "lots"),
        ]))
        .unwrap_err();
        assert!(err.contains("integer"));
    }

    #[test]
    fn blank_fields_count_as_missing() {
        let err = validate_inventory_row(&row(&[
            ("sku", "   "),
            ("location", "Main"),
            ("quantity", "5"),
        ]))
        .unwrap_err();
        assert!(err.contains("sku"));
    }
}
