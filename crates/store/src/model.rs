//! Row types shared between the store implementations and the domain layer.

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, ProductId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog product with its current unit price and stock count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price_cents: i32,
    pub quantity: i32,
}

/// Fields for creating a product; the id is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price_cents: i32,
    pub quantity: i32,
}

/// An order header. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub created_at: DateTime<Utc>,
}

/// One line of an order. `price_cents` is the product's unit price captured
/// at placement time; later catalog price changes never alter it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price_cents: i32,
}

/// Fields for recording a line item inside a placement transaction.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price_cents: i32,
}

/// One row of the `orders LEFT JOIN order_items` read.
///
/// Order-level fields repeat on every row; item-level fields are NULL when
/// the order has no items.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub created_at: DateTime<Utc>,
    pub order_item_id: Option<i64>,
    pub product_id: Option<ProductId>,
    pub quantity: Option<i32>,
    pub price_cents: Option<i32>,
}

/// Outcome of a conditional stock reservation.
#[derive(Debug, Clone)]
pub enum StockOutcome {
    /// Stock was decremented; carries the product state after the update,
    /// including the unit price to snapshot onto the order item.
    Reserved(Product),
    /// No product with the requested id exists.
    NotFound,
    /// The product exists but holds fewer units than requested.
    Insufficient { available: i32 },
}
