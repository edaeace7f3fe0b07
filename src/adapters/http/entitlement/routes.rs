//! Axum router configuration for entitlement endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    get_entitlement, get_platform_config, invalidate_platform_config, list_redemptions,
    redeem_code, validate_code, EntitlementAppState,
};

/// Create the entitlement API router.
///
/// # Routes
///
/// ## User Endpoints
/// - `POST /users/:user_id/redemptions` - Redeem a code
/// - `GET /users/:user_id/redemptions` - Redemption history
/// - `GET /users/:user_id/entitlements/:product` - Entitlement for one product
///
/// ## Code Endpoints
/// - `GET /codes/:code` - Read-only code check
///
/// ## Platform Endpoints
/// - `GET /platform-config` - Cached platform configuration
pub fn entitlement_routes() -> Router<EntitlementAppState> {
    Router::new()
        .route(
            "/users/:user_id/redemptions",
            post(redeem_code).get(list_redemptions),
        )
        .route("/users/:user_id/entitlements/:product", get(get_entitlement))
        .route("/codes/:code", get(validate_code))
        .route("/platform-config", get(get_platform_config))
}

/// Create the complete entitlement module router, mounted under `/api`.
pub fn entitlement_router() -> Router<EntitlementAppState> {
    Router::new().nest("/api", entitlement_routes())
}

/// Operator-only routes. Never merged into the public router; the binary
/// serves them on a separate loopback listener.
///
/// - `POST /internal/platform-config/invalidate` - Drop the cached platform config
pub fn entitlement_admin_router() -> Router<EntitlementAppState> {
    Router::new().route(
        "/internal/platform-config/invalidate",
        post(invalidate_platform_config),
    )
}
