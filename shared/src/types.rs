//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Kinds of bulk CSV import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Products,
    Inventory,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Products => "products",
            ImportKind::Inventory => "inventory",
        }
    }
}

impl std::str::FromStr for ImportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(ImportKind::Products),
            "inventory" => Ok(ImportKind::Inventory),
            other => Err(format!("unknown import kind '{}'", other)),
        }
    }
}

/// Outcome of a bulk import: rows applied vs. rows skipped
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: u32,
    pub errors: u32,
}

/// A validated product import row
#[derive(Debug, Clone, PartialEq)]
pub struct ProductImportRow {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub category_name: String,
    pub unit_cost: rust_decimal::Decimal,
    pub min_stock_level: i32,
}

/// A validated inventory snapshot import row
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryImportRow {
    pub sku: String,
    pub location_name: String,
    pub quantity: i64,
}
