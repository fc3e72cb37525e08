//! Shared types and models for the StockTrack inventory platform
//!
//! This crate contains domain models, common types, and import-row
//! validation shared between the backend and other components.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
