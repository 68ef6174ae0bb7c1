//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{CatalogError, OrderError};
use serde::Serialize;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client (undecodable body, malformed path id).
    BadRequest(String),
    /// Order workflow error.
    Order(OrderError),
    /// Catalog error.
    Catalog(CatalogError),
}

/// Wire shape of every error response.
#[derive(Serialize)]
struct ErrorBody {
    error_code: &'static str,
    error_message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::Order(err) => order_error_to_response(err),
            ApiError::Catalog(err) => catalog_error_to_response(err),
        };

        let body = ErrorBody {
            error_code,
            error_message,
        };
        (status, axum::Json(body)).into_response()
    }
}

fn order_error_to_response(err: OrderError) -> (StatusCode, &'static str, String) {
    match &err {
        OrderError::InvalidOrder => (StatusCode::BAD_REQUEST, "validation_error", err.to_string()),
        OrderError::ProductNotFound(_) | OrderError::OrderNotFound(_) => {
            (StatusCode::NOT_FOUND, "validation_error", err.to_string())
        }
        OrderError::ProductNoStock { .. } => (
            StatusCode::EXPECTATION_FAILED,
            "validation_error",
            err.to_string(),
        ),
        // Full detail stays in the server logs; the client gets an opaque 500.
        OrderError::Store(_) => {
            tracing::error!(error = %err, "storage failure while handling order request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "unexpected server error".to_string(),
            )
        }
    }
}

fn catalog_error_to_response(err: CatalogError) -> (StatusCode, &'static str, String) {
    match &err {
        CatalogError::ProductNotFound(_) => {
            (StatusCode::NOT_FOUND, "validation_error", err.to_string())
        }
        CatalogError::Store(_) => {
            tracing::error!(error = %err, "storage failure while handling catalog request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "unexpected server error".to_string(),
            )
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}
