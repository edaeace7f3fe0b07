//! HTTP DTOs (Data Transfer Objects) for entitlement endpoints.
//!
//! These types define the JSON request/response structure for the entitlement API.
//! They serve as the boundary between HTTP and the application layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::{CodeCheck, EntitlementView, RedeemCodeResult};
use crate::domain::entitlement::{
    EntitlementDisplay, EntitlementProduct, EntitlementTier, RedemptionRecord,
};
use crate::domain::platform::PlatformConfig;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to redeem a code.
#[derive(Debug, Clone, Deserialize)]
pub struct RedeemCodeRequest {
    /// The code as typed by the user.
    pub code: String,
    /// Product the client is redeeming for. Omit to accept the code's product.
    #[serde(default)]
    pub product: Option<EntitlementProduct>,
}

/// Query parameters for redemption history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRedemptionsParams {
    pub limit: Option<u32>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// One ledger entry.
#[derive(Debug, Clone, Serialize)]
pub struct RedemptionRecordResponse {
    pub id: String,
    pub code: String,
    pub code_type: EntitlementTier,
    pub product: EntitlementProduct,
    pub duration_days: u32,
    /// Expiry before this redemption (ISO 8601), null on first grant.
    pub previous_expires_at: Option<String>,
    /// Expiry after this redemption (ISO 8601).
    pub new_expires_at: String,
    pub redeemed_at: String,
}

impl From<RedemptionRecord> for RedemptionRecordResponse {
    fn from(record: RedemptionRecord) -> Self {
        Self {
            id: record.id.to_string(),
            code: record.code.to_string(),
            code_type: record.code_type,
            product: record.product,
            duration_days: record.duration_days,
            previous_expires_at: record.previous_expires_at.map(|t| t.to_string()),
            new_expires_at: record.new_expires_at.to_string(),
            redeemed_at: record.redeemed_at.to_string(),
        }
    }
}

/// Entitlement state for one product.
#[derive(Debug, Clone, Serialize)]
pub struct EntitlementResponse {
    pub user_id: String,
    pub product: EntitlementProduct,
    /// ISO 8601, null if never granted.
    pub expires_at: Option<String>,
    pub is_active: bool,
    /// Most recent grant's tier; null unless active.
    pub current_tier: Option<EntitlementTier>,
    pub days_remaining: u32,
    pub display: EntitlementDisplay,
    /// `"not activated"`, `"expired"`, or the local expiry date.
    pub display_text: String,
}

impl From<EntitlementView> for EntitlementResponse {
    fn from(view: EntitlementView) -> Self {
        Self {
            user_id: view.user_id.to_string(),
            product: view.product,
            expires_at: view.expires_at.map(|t| t.to_string()),
            is_active: view.is_active,
            current_tier: view.current_tier,
            days_remaining: view.days_remaining,
            display_text: view.display.to_string(),
            display: view.display,
        }
    }
}

/// Response for a successful redemption.
#[derive(Debug, Clone, Serialize)]
pub struct RedeemCodeResponse {
    pub record: RedemptionRecordResponse,
    pub entitlement: EntitlementResponse,
}

impl RedeemCodeResponse {
    /// Combines the committed record with the entitlement view built from it.
    pub fn new(result: RedeemCodeResult, view: EntitlementView) -> Self {
        Self {
            record: RedemptionRecordResponse::from(result.record),
            entitlement: EntitlementResponse::from(view),
        }
    }
}

/// Redemption history, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct RedemptionHistoryResponse {
    pub records: Vec<RedemptionRecordResponse>,
}

impl From<Vec<RedemptionRecord>> for RedemptionHistoryResponse {
    fn from(records: Vec<RedemptionRecord>) -> Self {
        Self {
            records: records.into_iter().map(RedemptionRecordResponse::from).collect(),
        }
    }
}

/// What a redeemable code would grant.
#[derive(Debug, Clone, Serialize)]
pub struct CodeCheckResponse {
    pub code: String,
    pub tier: EntitlementTier,
    pub product: EntitlementProduct,
    pub duration_days: u32,
    pub expires_at: String,
}

impl From<CodeCheck> for CodeCheckResponse {
    fn from(check: CodeCheck) -> Self {
        Self {
            code: check.code.to_string(),
            tier: check.tier,
            product: check.product,
            duration_days: check.duration_days,
            expires_at: check.expires_at.to_string(),
        }
    }
}

/// Client-facing platform configuration.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformConfigResponse {
    pub redemption_enabled: bool,
    pub support_contact: Option<String>,
    pub announcement: Option<String>,
    /// Display prices in minor units, keyed by tier.
    pub vip_prices: BTreeMap<EntitlementTier, u32>,
}

impl From<&PlatformConfig> for PlatformConfigResponse {
    fn from(config: &PlatformConfig) -> Self {
        Self {
            redemption_enabled: config.redemption_enabled,
            support_contact: config.support_contact.clone(),
            announcement: config.announcement.clone(),
            vip_prices: config.vip_prices.clone(),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
