//! HTTP adapters - REST API implementations.
//!
//! `app` assembles the public service: entitlement routes under `/api`, a
//! `/health` check, and the tower-http tracing and CORS layers. `admin_app`
//! holds operator endpoints and is only ever bound to loopback.

pub mod entitlement;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use entitlement::{entitlement_admin_router, entitlement_router, ApiError, EntitlementAppState};

/// GET /health - Liveness check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the complete application router.
pub fn app(state: EntitlementAppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(entitlement_router().with_state(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Builds the operator router (cache invalidation).
pub fn admin_app(state: EntitlementAppState) -> Router {
    entitlement_admin_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
