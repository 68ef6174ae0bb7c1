//! Order placement and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::OrderId;
use domain::{CreateOrderParams, OrderCompleted, OrderService, ProductService};
use store::{CatalogStore, Order, OrderStore};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: CatalogStore + OrderStore> {
    pub products: ProductService<S>,
    pub orders: OrderService<S>,
}

/// POST /orders — place a new order.
///
/// The body is [`CreateOrderParams`]; unknown fields are rejected. Returns
/// the created order header with 201; callers that need the items fetch the
/// full aggregate via GET /orders/{id}.
#[tracing::instrument(skip_all)]
pub async fn place<S: CatalogStore + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateOrderParams>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let Json(params) = payload.map_err(|e| ApiError::BadRequest(format!("invalid order: {e}")))?;
    let order = state.orders.place_order(params).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/{id} — load an order with its items and computed total.
#[tracing::instrument(skip_all)]
pub async fn get<S: CatalogStore + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    id: Result<Path<OrderId>, PathRejection>,
) -> Result<Json<OrderCompleted>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::BadRequest(format!("invalid order id: {e}")))?;
    let completed = state.orders.find_order_by_id(id).await?;
    Ok(Json(completed))
}
