use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use common::{CustomerId, OrderId, ProductId};

use crate::{
    error::Result,
    model::{NewOrderItem, NewProduct, Order, OrderItem, OrderRow, Product, StockOutcome},
    store::{CatalogStore, OrderStore, PlacementTx},
};

/// In-memory store implementation for testing.
///
/// Mirrors the PostgreSQL implementation's semantics: placement writes stay
/// invisible until commit, and stock reservations happen atomically under
/// one lock so concurrent placements can never jointly overdraw a product.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemState>>,
}

#[derive(Default)]
struct MemState {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    items: Vec<OrderItem>,
    next_product_id: i64,
    next_order_id: i64,
    next_item_id: i64,
}

fn lock(state: &Mutex<MemState>) -> MutexGuard<'_, MemState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of persisted orders.
    pub fn order_count(&self) -> usize {
        lock(&self.state).orders.len()
    }

    /// Returns the number of persisted order items.
    pub fn item_count(&self) -> usize {
        lock(&self.state).items.len()
    }

    /// Overwrites a product's unit price. Test helper for exercising
    /// price-snapshot behavior.
    pub fn set_price(&self, id: ProductId, price_cents: i32) {
        if let Some(product) = lock(&self.state).products.get_mut(&id) {
            product.price_cents = price_cents;
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(lock(&self.state).products.values().cloned().collect())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(lock(&self.state).products.get(&id).cloned())
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let mut state = lock(&self.state);
        state.next_product_id += 1;
        let product = Product {
            id: ProductId::new(state.next_product_id),
            name: product.name,
            price_cents: product.price_cents,
            quantity: product.quantity,
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn apply_stock_delta(&self, id: ProductId, delta: i32) -> Result<Option<Product>> {
        let mut state = lock(&self.state);
        Ok(state.products.get_mut(&id).map(|product| {
            product.quantity += delta;
            product.clone()
        }))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn begin_placement(&self) -> Result<Box<dyn PlacementTx>> {
        Ok(Box::new(MemPlacementTx {
            state: self.state.clone(),
            staged_order: None,
            staged_items: Vec::new(),
            reserved: Vec::new(),
            committed: false,
        }))
    }

    async fn find_order_rows(&self, id: OrderId) -> Result<Vec<OrderRow>> {
        let state = lock(&self.state);
        let Some(order) = state.orders.get(&id) else {
            return Ok(Vec::new());
        };

        let items: Vec<&OrderItem> = state.items.iter().filter(|i| i.order_id == id).collect();
        if items.is_empty() {
            // Outer-join shape: one row with NULL item fields.
            return Ok(vec![OrderRow {
                order_id: order.id,
                customer_id: order.customer_id,
                created_at: order.created_at,
                order_item_id: None,
                product_id: None,
                quantity: None,
                price_cents: None,
            }]);
        }

        Ok(items
            .into_iter()
            .map(|item| OrderRow {
                order_id: order.id,
                customer_id: order.customer_id,
                created_at: order.created_at,
                order_item_id: Some(item.id),
                product_id: Some(item.product_id),
                quantity: Some(item.quantity),
                price_cents: Some(item.price_cents),
            })
            .collect())
    }
}

/// Placement transaction over the in-memory state.
///
/// The order and its items are staged locally and only become visible at
/// commit. Stock is decremented eagerly under the lock so a concurrent
/// placement observes the reservation immediately; the decrement is undone
/// on drop if the placement never commits.
struct MemPlacementTx {
    state: Arc<Mutex<MemState>>,
    staged_order: Option<Order>,
    staged_items: Vec<OrderItem>,
    reserved: Vec<(ProductId, i32)>,
    committed: bool,
}

#[async_trait]
impl PlacementTx for MemPlacementTx {
    async fn create_order(&mut self, customer_id: CustomerId) -> Result<Order> {
        let mut state = lock(&self.state);
        state.next_order_id += 1;
        let order = Order {
            id: OrderId::new(state.next_order_id),
            customer_id,
            created_at: Utc::now(),
        };
        self.staged_order = Some(order.clone());
        Ok(order)
    }

    async fn reserve_stock(&mut self, id: ProductId, quantity: i32) -> Result<StockOutcome> {
        let mut state = lock(&self.state);
        let Some(product) = state.products.get_mut(&id) else {
            return Ok(StockOutcome::NotFound);
        };
        if product.quantity < quantity {
            return Ok(StockOutcome::Insufficient {
                available: product.quantity,
            });
        }

        product.quantity -= quantity;
        let snapshot = product.clone();
        self.reserved.push((id, quantity));
        Ok(StockOutcome::Reserved(snapshot))
    }

    async fn insert_item(&mut self, item: NewOrderItem) -> Result<OrderItem> {
        let mut state = lock(&self.state);
        state.next_item_id += 1;
        let item = OrderItem {
            id: state.next_item_id,
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price_cents: item.price_cents,
        };
        self.staged_items.push(item.clone());
        Ok(item)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut this = self;
        let mut state = lock(&this.state);
        if let Some(order) = this.staged_order.take() {
            state.orders.insert(order.id, order);
        }
        state.items.append(&mut this.staged_items);
        this.committed = true;
        Ok(())
    }
}

impl Drop for MemPlacementTx {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Rollback: return every reserved unit.
        let mut state = lock(&self.state);
        for (id, quantity) in self.reserved.drain(..) {
            if let Some(product) = state.products.get_mut(&id) {
                product.quantity += quantity;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_product(store: &InMemoryStore, price_cents: i32, quantity: i32) -> Product {
        store
            .create_product(NewProduct {
                name: "Widget".to_string(),
                price_cents,
                quantity,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn committed_placement_is_visible() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, 1000, 5).await;

        let mut tx = store.begin_placement().await.unwrap();
        let order = tx.create_order(CustomerId::new(1)).await.unwrap();
        let outcome = tx.reserve_stock(product.id, 2).await.unwrap();
        let reserved = match outcome {
            StockOutcome::Reserved(p) => p,
            other => panic!("expected reservation, got {other:?}"),
        };
        assert_eq!(reserved.quantity, 3);

        tx.insert_item(NewOrderItem {
            order_id: order.id,
            product_id: product.id,
            quantity: 2,
            price_cents: reserved.price_cents,
        })
        .await
        .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.order_count(), 1);
        assert_eq!(store.item_count(), 1);
        let rows = store.find_order_rows(order.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, Some(2));
    }

    #[tokio::test]
    async fn dropped_placement_rolls_back_stock_and_rows() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, 1000, 5).await;

        {
            let mut tx = store.begin_placement().await.unwrap();
            let order = tx.create_order(CustomerId::new(1)).await.unwrap();
            tx.reserve_stock(product.id, 4).await.unwrap();
            tx.insert_item(NewOrderItem {
                order_id: order.id,
                product_id: product.id,
                quantity: 4,
                price_cents: 1000,
            })
            .await
            .unwrap();
            // Dropped without commit.
        }

        assert_eq!(store.order_count(), 0);
        assert_eq!(store.item_count(), 0);
        let product = store.find_product(product.id).await.unwrap().unwrap();
        assert_eq!(product.quantity, 5);
    }

    #[tokio::test]
    async fn uncommitted_placement_is_invisible_but_stock_is_held() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, 1000, 3).await;

        let mut tx = store.begin_placement().await.unwrap();
        tx.create_order(CustomerId::new(1)).await.unwrap();
        tx.reserve_stock(product.id, 3).await.unwrap();

        // Another placement must not be able to take the same units.
        let mut other = store.begin_placement().await.unwrap();
        let outcome = other.reserve_stock(product.id, 1).await.unwrap();
        assert!(matches!(
            outcome,
            StockOutcome::Insufficient { available: 0 }
        ));

        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn reserve_stock_reports_missing_product() {
        let store = InMemoryStore::new();
        let mut tx = store.begin_placement().await.unwrap();
        let outcome = tx.reserve_stock(ProductId::new(99), 1).await.unwrap();
        assert!(matches!(outcome, StockOutcome::NotFound));
    }

    #[tokio::test]
    async fn apply_stock_delta_restocks_and_consumes() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, 500, 1).await;

        let restocked = store
            .apply_stock_delta(product.id, 4)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(restocked.quantity, 5);

        let consumed = store
            .apply_stock_delta(product.id, -2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(consumed.quantity, 3);

        assert!(
            store
                .apply_stock_delta(ProductId::new(42), 1)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn find_order_rows_for_unknown_id_is_empty() {
        let store = InMemoryStore::new();
        let rows = store.find_order_rows(OrderId::new(1)).await.unwrap();
        assert!(rows.is_empty());
    }
}
