//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::ProductId;
use store::{CatalogStore, NewProduct, OrderStore, Product};

use crate::error::ApiError;
use crate::routes::orders::AppState;

/// GET /products — list the catalog.
#[tracing::instrument(skip_all)]
pub async fn list<S: CatalogStore + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.products.list_products().await?;
    Ok(Json(products))
}

/// GET /products/{id} — look up one product.
#[tracing::instrument(skip_all)]
pub async fn get<S: CatalogStore + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    id: Result<Path<ProductId>, PathRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::BadRequest(format!("invalid product id: {e}")))?;
    let product = state.products.find_product_by_id(id).await?;
    Ok(Json(product))
}

/// POST /products — create a product.
#[tracing::instrument(skip_all)]
pub async fn create<S: CatalogStore + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(new_product) =
        payload.map_err(|e| ApiError::BadRequest(format!("invalid product: {e}")))?;
    let product = state.products.create_product(new_product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}
