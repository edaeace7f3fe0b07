//! HTTP handlers for entitlement endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::FixedOffset;
use tracing::warn;

use crate::application::{
    EntitlementView, GetEntitlementHandler, GetEntitlementQuery, ListRedemptionsHandler,
    ListRedemptionsQuery, PlatformConfigCache, RedeemCodeCommand, RedeemCodeHandler,
    RedemptionSettings, ValidateCodeHandler, ValidateCodeQuery,
};
use crate::domain::entitlement::{EntitlementProduct, RedemptionError};
use crate::domain::foundation::{DomainError, Timestamp, UserId, ValidationError};
use crate::ports::{EntitlementReader, RedemptionCodeRepository, RedemptionRepository};

use super::dto::{
    CodeCheckResponse, EntitlementResponse, ErrorResponse, ListRedemptionsParams,
    PlatformConfigResponse, RedeemCodeRequest, RedeemCodeResponse, RedemptionHistoryResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct EntitlementAppState {
    pub code_repository: Arc<dyn RedemptionCodeRepository>,
    pub entitlement_reader: Arc<dyn EntitlementReader>,
    pub redemption_repository: Arc<dyn RedemptionRepository>,
    pub platform_config: Arc<PlatformConfigCache>,
    pub settings: RedemptionSettings,
    pub display_offset: FixedOffset,
}

impl EntitlementAppState {
    /// Create handlers on demand from the shared state.
    pub fn redeem_code_handler(&self) -> RedeemCodeHandler {
        RedeemCodeHandler::new(
            self.code_repository.clone(),
            self.entitlement_reader.clone(),
            self.redemption_repository.clone(),
            self.platform_config.clone(),
            self.settings,
        )
    }

    pub fn validate_code_handler(&self) -> ValidateCodeHandler {
        ValidateCodeHandler::new(self.code_repository.clone())
    }

    pub fn get_entitlement_handler(&self) -> GetEntitlementHandler {
        GetEntitlementHandler::new(self.entitlement_reader.clone(), self.display_offset)
    }

    pub fn list_redemptions_handler(&self) -> ListRedemptionsHandler {
        ListRedemptionsHandler::new(self.entitlement_reader.clone())
    }
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    UserId::new(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/users/:user_id/entitlements/:product - Current entitlement for one product
pub async fn get_entitlement(
    State(state): State<EntitlementAppState>,
    Path((user_id, product)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let product: EntitlementProduct = product
        .parse()
        .map_err(|e: ValidationError| ApiError::BadRequest(e.to_string()))?;
    let query = GetEntitlementQuery {
        user_id: parse_user_id(&user_id)?,
        product,
        at: Timestamp::now(),
    };

    let view = state.get_entitlement_handler().handle(query).await?;

    Ok(Json(EntitlementResponse::from(view)))
}

/// GET /api/users/:user_id/redemptions - Redemption history, newest first
pub async fn list_redemptions(
    State(state): State<EntitlementAppState>,
    Path(user_id): Path<String>,
    Query(params): Query<ListRedemptionsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = ListRedemptionsQuery {
        user_id: parse_user_id(&user_id)?,
        limit: params.limit,
    };

    let records = state.list_redemptions_handler().handle(query).await?;

    Ok(Json(RedemptionHistoryResponse::from(records)))
}

/// GET /api/codes/:code - Check a code without redeeming it
pub async fn validate_code(
    State(state): State<EntitlementAppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let query = ValidateCodeQuery {
        code,
        checked_at: Timestamp::now(),
    };

    let check = state.validate_code_handler().handle(query).await?;

    Ok(Json(CodeCheckResponse::from(check)))
}

/// GET /api/platform-config - Cached platform configuration
pub async fn get_platform_config(
    State(state): State<EntitlementAppState>,
) -> Result<impl IntoResponse, ApiError> {
    let config = state.platform_config.get().await?;
    Ok(Json(PlatformConfigResponse::from(config.as_ref())))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/users/:user_id/redemptions - Redeem a code
pub async fn redeem_code(
    State(state): State<EntitlementAppState>,
    Path(user_id): Path<String>,
    Json(request): Json<RedeemCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Timestamp::now();
    let cmd = RedeemCodeCommand {
        user_id: parse_user_id(&user_id)?,
        code: request.code,
        product: request.product,
        requested_at: now,
    };

    let result = state.redeem_code_handler().handle(cmd).await?;
    let view = EntitlementView::build(&result.entitlement, now, &state.display_offset);

    Ok((StatusCode::CREATED, Json(RedeemCodeResponse::new(result, view))))
}

/// POST /internal/platform-config/invalidate - Drop the cached platform configuration
pub async fn invalidate_platform_config(
    State(state): State<EntitlementAppState>,
) -> impl IntoResponse {
    state.platform_config.invalidate().await;
    StatusCode::NO_CONTENT
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Redemption(RedemptionError),
    /// Malformed path or query input outside the redemption flow.
    BadRequest(String),
    /// Platform configuration could not be loaded.
    Unavailable(DomainError),
}

impl From<RedemptionError> for ApiError {
    fn from(err: RedemptionError) -> Self {
        Self::Redemption(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Unavailable(err)
    }
}

/// HTTP status for each redemption error.
pub fn status_for(err: &RedemptionError) -> StatusCode {
    match err {
        RedemptionError::InvalidCode(_) => StatusCode::BAD_REQUEST,
        RedemptionError::NotFound(_) => StatusCode::NOT_FOUND,
        RedemptionError::AlreadyUsed(_) | RedemptionError::AlreadyRedeemedByUser(_) => {
            StatusCode::CONFLICT
        }
        RedemptionError::Expired(_) => StatusCode::GONE,
        RedemptionError::ProductMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        RedemptionError::RedemptionDisabled => StatusCode::FORBIDDEN,
        RedemptionError::PersistenceFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        RedemptionError::OutcomeUnknown { .. } => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::Redemption(err) => {
                if err.requires_status_check() {
                    warn!(error = %err, "Redemption request ended without a definite outcome");
                }
                (
                    status_for(&err),
                    ErrorResponse::new(err.code().to_string(), err.user_message()),
                )
            }
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_FAILED", message),
            ),
            ApiError::Unavailable(err) => {
                warn!(error = %err, "Platform config unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new(err.code.to_string(), "Service temporarily unavailable."),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rejection_maps_to_its_status() {
        let cases = [
            (
                RedemptionError::InvalidCode(ValidationError::empty_field("code")),
                StatusCode::BAD_REQUEST,
            ),
            (RedemptionError::not_found("X"), StatusCode::NOT_FOUND),
            (RedemptionError::already_used("X"), StatusCode::CONFLICT),
            (RedemptionError::already_redeemed("X"), StatusCode::CONFLICT),
            (RedemptionError::expired("X"), StatusCode::GONE),
            (
                RedemptionError::ProductMismatch {
                    code: "X".to_string(),
                    requested: EntitlementProduct::Lottery,
                    actual: EntitlementProduct::Vip,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (RedemptionError::RedemptionDisabled, StatusCode::FORBIDDEN),
            (RedemptionError::persistence("down"), StatusCode::SERVICE_UNAVAILABLE),
            (
                RedemptionError::OutcomeUnknown { timeout_secs: 20 },
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(status_for(&err), status, "{:?}", err);
        }
    }

    #[test]
    fn error_response_carries_stable_code() {
        let response = ApiError::from(RedemptionError::expired("OLD1")).into_response();
        assert_eq!(response.status(), StatusCode::GONE);
    }
}
