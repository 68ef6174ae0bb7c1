//! Shared identifier types for the catalog/ordering service.

pub mod types;

pub use types::{CustomerId, OrderId, ProductId};
