//! Storage traits consumed by the domain services.

use async_trait::async_trait;
use common::{CustomerId, OrderId, ProductId};

use crate::error::Result;
use crate::model::{NewOrderItem, NewProduct, Order, OrderItem, OrderRow, Product, StockOutcome};

/// Single-row product reads and writes.
///
/// The accessor holds no cross-row invariant of its own; placement
/// consistency is the order workflow's responsibility.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Lists all products ordered by id.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Looks up a product by id.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Creates a product and returns it with its assigned id.
    async fn create_product(&self, product: NewProduct) -> Result<Product>;

    /// Adjusts a product's stock by `delta` (negative for consumption,
    /// positive for restock). Returns the updated product, or `None` when
    /// no product with that id exists.
    async fn apply_stock_delta(&self, id: ProductId, delta: i32) -> Result<Option<Product>>;
}

/// Order persistence.
///
/// Placement writes go through a [`PlacementTx`] so the order header, its
/// items and the stock decrements commit or roll back as one unit.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Opens a placement transaction.
    async fn begin_placement(&self) -> Result<Box<dyn PlacementTx>>;

    /// Denormalized `orders LEFT JOIN order_items` read: one row per item,
    /// or a single row with NULL item fields for an itemless order. An
    /// unknown id yields no rows.
    async fn find_order_rows(&self, id: OrderId) -> Result<Vec<OrderRow>>;
}

/// One in-flight placement.
///
/// Dropping the transaction without calling [`commit`](PlacementTx::commit)
/// rolls back every write made through it, stock reservations included.
#[async_trait]
pub trait PlacementTx: Send {
    /// Creates the order header and returns it with its generated id and
    /// creation timestamp.
    async fn create_order(&mut self, customer_id: CustomerId) -> Result<Order>;

    /// Check-and-decrement in a single atomic step: stock is reserved only
    /// when the product exists and holds at least `quantity` units.
    async fn reserve_stock(&mut self, id: ProductId, quantity: i32) -> Result<StockOutcome>;

    /// Records one order line item.
    async fn insert_item(&mut self, item: NewOrderItem) -> Result<OrderItem>;

    /// Makes every write of this placement durable.
    async fn commit(self: Box<Self>) -> Result<()>;
}
