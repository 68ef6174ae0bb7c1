//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{CatalogStore, InMemoryStore, NewProduct, Product};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, InMemoryStore) {
    let store = InMemoryStore::new();
    let state = api::create_state(store.clone());
    let app = api::create_app(state, get_metrics_handle());
    (app, store)
}

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

async fn send_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(value) => Body::from(serde_json::to_string(&value).unwrap()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();
    let (status, json) = send_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_create_and_get_product() {
    let (app, _) = setup();

    let (status, created) = send_json(
        &app,
        "POST",
        "/products",
        Some(serde_json::json!({
            "name": "Widget",
            "price_cents": 10000,
            "quantity": 10
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Widget");
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = send_json(&app, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, all) = send_json(&app, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_missing_product_is_404() {
    let (app, _) = setup();
    let (status, json) = send_json(&app, "GET", "/products/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error_code"], "validation_error");
    assert!(json["error_message"].as_str().is_some());
}

#[tokio::test]
async fn test_place_order_and_fetch_aggregate() {
    let (app, store) = setup();
    let product = seed_product(&store, 10_000, 10).await;

    let (status, order) = send_json(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "customer_id": 1,
            "items": [{"product_id": product.id.as_i64(), "quantity": 1}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["customer_id"], 1);
    let order_id = order["id"].as_i64().unwrap();

    let (status, completed) = send_json(&app, "GET", &format!("/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["order"]["id"], order_id);
    assert_eq!(completed["order"]["customer_id"], 1);
    let items = completed["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_id"], product.id.as_i64());
    assert_eq!(items[0]["quantity"], 1);
    assert_eq!(items[0]["price_cents"], 10_000);
    assert_eq!(completed["total_price_cents"], 10_000);

    // Stock decreased by the placed quantity.
    let (_, fetched) =
        send_json(&app, "GET", &format!("/products/{}", product.id), None).await;
    assert_eq!(fetched["quantity"], 9);
}

#[tokio::test]
async fn test_place_order_unknown_product_is_404() {
    let (app, _) = setup();

    let (status, json) = send_json(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "customer_id": 1,
            "items": [{"product_id": 99, "quantity": 1}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error_code"], "validation_error");
}

#[tokio::test]
async fn test_place_order_insufficient_stock_is_417() {
    let (app, store) = setup();
    let product = seed_product(&store, 10_000, 2).await;

    let (status, json) = send_json(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "customer_id": 1,
            "items": [{"product_id": product.id.as_i64(), "quantity": 3}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::EXPECTATION_FAILED);
    assert_eq!(json["error_code"], "validation_error");

    // No stock mutation survived the failed placement.
    let (_, fetched) =
        send_json(&app, "GET", &format!("/products/{}", product.id), None).await;
    assert_eq!(fetched["quantity"], 2);
}

#[tokio::test]
async fn test_invalid_order_requests_are_400() {
    let (app, store) = setup();
    let product = seed_product(&store, 10_000, 10).await;

    // Empty item list.
    let (status, json) = send_json(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({"customer_id": 1, "items": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_code"], "validation_error");

    // Zero customer id.
    let (status, _) = send_json(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "customer_id": 0,
            "items": [{"product_id": product.id.as_i64(), "quantity": 1}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown fields are rejected.
    let (status, _) = send_json(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "customer_id": 1,
            "items": [{"product_id": product.id.as_i64(), "quantity": 1}],
            "coupon": "WELCOME"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_order_id_is_400() {
    let (app, _) = setup();
    let (status, json) = send_json(&app, "GET", "/orders/not-a-number", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_code"], "validation_error");
}

#[tokio::test]
async fn test_get_unknown_order_is_404() {
    let (app, _) = setup();
    let (status, json) = send_json(&app, "GET", "/orders/424242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error_code"], "validation_error");
}

#[tokio::test]
async fn test_metrics_count_placed_and_failed_orders() {
    let (app, store) = setup();
    let product = seed_product(&store, 1_000, 1).await;

    // One successful placement, one that fails on stock.
    let (status, _) = send_json(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "customer_id": 1,
            "items": [{"product_id": product.id.as_i64(), "quantity": 1}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send_json(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "customer_id": 2,
            "items": [{"product_id": product.id.as_i64(), "quantity": 1}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::EXPECTATION_FAILED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let rendered = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(rendered.contains("orders_placed_total"));
    assert!(rendered.contains("orders_failed_total"));
}

/// Store whose every operation fails, for exercising the opaque 500 path.
#[derive(Clone)]
struct BrokenStore;

fn connection_lost() -> store::StoreError {
    store::StoreError::Database(sqlx::Error::PoolClosed)
}

#[async_trait::async_trait]
impl CatalogStore for BrokenStore {
    async fn list_products(&self) -> store::Result<Vec<Product>> {
        Err(connection_lost())
    }

    async fn find_product(&self, _id: store::ProductId) -> store::Result<Option<Product>> {
        Err(connection_lost())
    }

    async fn create_product(&self, _product: NewProduct) -> store::Result<Product> {
        Err(connection_lost())
    }

    async fn apply_stock_delta(
        &self,
        _id: store::ProductId,
        _delta: i32,
    ) -> store::Result<Option<Product>> {
        Err(connection_lost())
    }
}

#[async_trait::async_trait]
impl store::OrderStore for BrokenStore {
    async fn begin_placement(&self) -> store::Result<Box<dyn store::PlacementTx>> {
        Err(connection_lost())
    }

    async fn find_order_rows(&self, _id: store::OrderId) -> store::Result<Vec<store::OrderRow>> {
        Err(connection_lost())
    }
}

#[tokio::test]
async fn test_store_failure_is_an_opaque_500() {
    let state = api::create_state(BrokenStore);
    let app = api::create_app(state, get_metrics_handle());

    // Catalog path.
    let (status, json) = send_json(&app, "GET", "/products/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error_code"], "server_error");
    assert_eq!(json["error_message"], "unexpected server error");

    // Placement path: a well-formed request that dies in the store.
    let (status, json) = send_json(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "customer_id": 1,
            "items": [{"product_id": 1, "quantity": 1}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error_code"], "server_error");
    assert_eq!(json["error_message"], "unexpected server error");
}
