//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

/// Payload of the liveness probe.
#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
}

/// GET /health — liveness probe. Reports `ok` as long as the process is
/// serving requests; database reachability is not checked here.
pub async fn check() -> Json<Health> {
    Json(Health { status: "ok" })
}
