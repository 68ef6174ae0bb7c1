//! Domain layer for the catalog/ordering service.
//!
//! This crate owns the order placement workflow (validate, transact,
//! reserve stock, commit or roll back as a unit), the read path that
//! reconstructs a complete order from the denormalized join, and the
//! catalog service wrapping single-row product operations.

pub mod error;
pub mod orders;
pub mod products;

pub use error::{CatalogError, OrderError};
pub use orders::{CreateOrderParams, OrderCompleted, OrderItemParams, OrderService};
pub use products::ProductService;
