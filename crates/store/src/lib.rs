//! Storage layer for the catalog/ordering service.
//!
//! Exposes the row types, the storage traits consumed by the domain
//! services, and two implementations: a PostgreSQL-backed store and an
//! in-memory store for tests.

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use common::{CustomerId, OrderId, ProductId};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use model::{NewOrderItem, NewProduct, Order, OrderItem, OrderRow, Product, StockOutcome};
pub use postgres::PostgresStore;
pub use store::{CatalogStore, OrderStore, PlacementTx};
