//! Business logic services for the StockTrack platform

pub mod catalog;
pub mod import;
pub mod stock;

pub use catalog::CatalogService;
pub use import::ImportService;
pub use stock::StockService;
