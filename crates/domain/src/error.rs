//! Domain error types.

use common::{OrderId, ProductId};
use store::StoreError;
use thiserror::Error;

/// Errors from the order placement workflow and order reads.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request was malformed: zero customer id, empty item list or a
    /// non-positive item quantity.
    #[error("invalid order")]
    InvalidOrder,

    /// A line item referenced a product that does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// A line item requested more units than the product has in stock.
    #[error("product {id} has not enough stock: requested {requested}, available {available}")]
    ProductNoStock {
        id: ProductId,
        requested: i32,
        available: i32,
    },

    /// No order with the requested id exists.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The backing store failed. Never partially applied: the placement
    /// transaction is rolled back before this surfaces.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product with the requested id exists.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
