use async_trait::async_trait;
use common::{CustomerId, OrderId, ProductId};
use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    error::Result,
    model::{NewOrderItem, NewProduct, Order, OrderItem, OrderRow, Product, StockOutcome},
    store::{CatalogStore, OrderStore, PlacementTx},
};

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, price_cents, quantity FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price_cents, quantity FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, price_cents, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, name, price_cents, quantity
            "#,
        )
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    async fn apply_stock_delta(&self, id: ProductId, delta: i32) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET quantity = quantity + $2
            WHERE id = $1
            RETURNING id, name, price_cents, quantity
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn begin_placement(&self) -> Result<Box<dyn PlacementTx>> {
        let tx = self.pool.begin().await?;
        tracing::debug!("placement transaction opened");
        Ok(Box::new(PgPlacementTx { tx }))
    }

    async fn find_order_rows(&self, id: OrderId) -> Result<Vec<OrderRow>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT o.id AS order_id,
                   o.customer_id,
                   o.created_at,
                   oi.id AS order_item_id,
                   oi.product_id,
                   oi.quantity,
                   oi.price_cents
            FROM orders o
            LEFT JOIN order_items oi ON oi.order_id = o.id
            WHERE o.id = $1
            ORDER BY oi.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// Placement transaction over a PostgreSQL transaction.
///
/// sqlx rolls the transaction back when it is dropped without an explicit
/// commit, which gives the all-or-nothing guarantee for free.
struct PgPlacementTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl PlacementTx for PgPlacementTx {
    async fn create_order(&mut self, customer_id: CustomerId) -> Result<Order> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (customer_id)
            VALUES ($1)
            RETURNING id, customer_id, created_at
            "#,
        )
        .bind(customer_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(order)
    }

    async fn reserve_stock(&mut self, id: ProductId, quantity: i32) -> Result<StockOutcome> {
        // Conditional update: two concurrent placements can never both pass
        // the stock check, the second blocks on the row lock and re-evaluates.
        let reserved = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET quantity = quantity - $2
            WHERE id = $1 AND quantity >= $2
            RETURNING id, name, price_cents, quantity
            "#,
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(&mut *self.tx)
        .await?;

        if let Some(product) = reserved {
            return Ok(StockOutcome::Reserved(product));
        }

        // Distinguish a missing product from insufficient stock.
        let available: Option<i32> =
            sqlx::query_scalar("SELECT quantity FROM products WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await?;

        Ok(match available {
            Some(available) => StockOutcome::Insufficient { available },
            None => StockOutcome::NotFound,
        })
    }

    async fn insert_item(&mut self, item: NewOrderItem) -> Result<OrderItem> {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price_cents)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_id, product_id, quantity, price_cents
            "#,
        )
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price_cents)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(item)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
