//! Order placement workflow and order reconstruction.

use common::{CustomerId, OrderId, ProductId};
use serde::{Deserialize, Serialize};
use store::{NewOrderItem, Order, OrderItem, OrderStore, StockOutcome};

use crate::error::OrderError;

/// A placement request: one customer and at least one line item.
///
/// This is a request value, never persisted as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderParams {
    pub customer_id: CustomerId,
    pub items: Vec<OrderItemParams>,
}

/// One requested line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderItemParams {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A fully reconstructed order: header, line items and derived total.
///
/// Rebuilt on every read from the denormalized join; not a stored entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCompleted {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub total_price_cents: i64,
}

/// Service owning the placement workflow and the order read path.
pub struct OrderService<S: OrderStore> {
    store: S,
}

impl<S: OrderStore> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Places an order.
    ///
    /// Validates the request, then creates the order header, records every
    /// line item with the product's current price as a snapshot, and
    /// reserves stock with an atomic conditional decrement. Everything runs
    /// inside one placement transaction: a failure on any item rolls back
    /// the header, all items and every stock reservation made so far.
    #[tracing::instrument(
        skip(self, params),
        fields(customer_id = %params.customer_id, items = params.items.len())
    )]
    pub async fn place_order(&self, params: CreateOrderParams) -> Result<Order, OrderError> {
        let result = self.run_placement(params).await;
        match &result {
            Ok(order) => {
                metrics::counter!("orders_placed_total").increment(1);
                tracing::info!(order_id = %order.id, "order placed");
            }
            Err(err) => {
                metrics::counter!("orders_failed_total").increment(1);
                tracing::warn!(error = %err, "order placement failed");
            }
        }
        result
    }

    async fn run_placement(&self, params: CreateOrderParams) -> Result<Order, OrderError> {
        if params.customer_id.is_zero() || params.items.is_empty() {
            return Err(OrderError::InvalidOrder);
        }
        if params.items.iter().any(|item| item.quantity <= 0) {
            return Err(OrderError::InvalidOrder);
        }

        let mut tx = self.store.begin_placement().await?;
        let order = tx.create_order(params.customer_id).await?;

        for item in &params.items {
            let product = match tx.reserve_stock(item.product_id, item.quantity).await? {
                StockOutcome::Reserved(product) => product,
                StockOutcome::NotFound => {
                    return Err(OrderError::ProductNotFound(item.product_id));
                }
                StockOutcome::Insufficient { available } => {
                    return Err(OrderError::ProductNoStock {
                        id: item.product_id,
                        requested: item.quantity,
                        available,
                    });
                }
            };

            tx.insert_item(NewOrderItem {
                order_id: order.id,
                product_id: product.id,
                quantity: item.quantity,
                price_cents: product.price_cents,
            })
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    /// Loads an order with its items and computed total.
    ///
    /// Folds the join rows: the header comes from the first row (all rows
    /// share it), one item is appended per row with present item fields,
    /// and the total accumulates quantity times snapshot price. An unknown
    /// id is an explicit [`OrderError::OrderNotFound`].
    #[tracing::instrument(skip(self))]
    pub async fn find_order_by_id(&self, id: OrderId) -> Result<OrderCompleted, OrderError> {
        let rows = self.store.find_order_rows(id).await?;
        let Some(first) = rows.first() else {
            return Err(OrderError::OrderNotFound(id));
        };

        let order = Order {
            id: first.order_id,
            customer_id: first.customer_id,
            created_at: first.created_at,
        };

        let mut items = Vec::with_capacity(rows.len());
        let mut total_price_cents = 0i64;
        for row in &rows {
            let (Some(item_id), Some(product_id), Some(quantity), Some(price_cents)) =
                (row.order_item_id, row.product_id, row.quantity, row.price_cents)
            else {
                // Itemless order: a single row with NULL item fields.
                continue;
            };
            items.push(OrderItem {
                id: item_id,
                order_id: order.id,
                product_id,
                quantity,
                price_cents,
            });
            total_price_cents += i64::from(quantity) * i64::from(price_cents);
        }

        Ok(OrderCompleted {
            order,
            items,
            total_price_cents,
        })
    }
}
