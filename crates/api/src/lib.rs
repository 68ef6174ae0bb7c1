//! HTTP API server for the catalog/ordering service.
//!
//! Provides REST endpoints for the product catalog and order placement,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use domain::{OrderService, ProductService};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{CatalogStore, OrderStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Per-request deadline. A timed-out or abandoned request drops its
/// placement future, which rolls the transaction back.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: CatalogStore + OrderStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/products", get(routes::products::list::<S>))
        .route("/products", post(routes::products::create::<S>))
        .route("/products/{id}", get(routes::products::get::<S>))
        .route("/orders", post(routes::orders::place::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over any store implementation.
pub fn create_state<S: CatalogStore + OrderStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        products: ProductService::new(store.clone()),
        orders: OrderService::new(store),
    })
}
