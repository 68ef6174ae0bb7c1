//! Catalog service: single-row product operations.
//!
//! No multi-step invariants live here; stock consistency during placement
//! is owned by [`crate::OrderService`].

use common::ProductId;
use store::{CatalogStore, NewProduct, Product};

use crate::error::CatalogError;

/// Service for catalog reads, product creation and stock adjustment.
pub struct ProductService<S: CatalogStore> {
    store: S,
}

impl<S: CatalogStore> ProductService<S> {
    /// Creates a new product service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists all products.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.list_products().await?)
    }

    /// Looks up a product by id.
    #[tracing::instrument(skip(self))]
    pub async fn find_product_by_id(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.store
            .find_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// Creates a product.
    #[tracing::instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        Ok(self.store.create_product(product).await?)
    }

    /// Restocks a product by `quantity` units.
    #[tracing::instrument(skip(self))]
    pub async fn add_stock(&self, id: ProductId, quantity: i32) -> Result<Product, CatalogError> {
        self.store
            .apply_stock_delta(id, quantity)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// Removes `quantity` units from a product's stock.
    #[tracing::instrument(skip(self))]
    pub async fn remove_stock(
        &self,
        id: ProductId,
        quantity: i32,
    ) -> Result<Product, CatalogError> {
        self.store
            .apply_stock_delta(id, -quantity)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }
}
