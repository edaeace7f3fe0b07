//! HTTP adapter for entitlement endpoints.
//!
//! Exposes the entitlement domain via REST API:
//! - `POST /api/users/:user_id/redemptions` - Redeem a code
//! - `GET /api/users/:user_id/redemptions` - Redemption history
//! - `GET /api/users/:user_id/entitlements/:product` - Current entitlement
//! - `GET /api/codes/:code` - Check a code without redeeming it
//! - `GET /api/platform-config` - Cached platform configuration
//!
//! Operator-only, on its own router:
//! - `POST /internal/platform-config/invalidate` - Drop the cached copy

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{ApiError, EntitlementAppState};
pub use routes::{entitlement_admin_router, entitlement_router, entitlement_routes};
