//! Redemption ledger entries.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{RedemptionRecordId, Timestamp, UserId};

use super::code::{CodeValue, RedemptionCode};
use super::tier::{EntitlementProduct, EntitlementTier};

/// One successful redemption. Append-only; at most one per (user, code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRecord {
    pub id: RedemptionRecordId,
    pub user_id: UserId,
    pub code: CodeValue,
    pub code_type: EntitlementTier,
    pub product: EntitlementProduct,
    pub duration_days: u32,
    pub previous_expires_at: Option<Timestamp>,
    pub new_expires_at: Timestamp,
    pub redeemed_at: Timestamp,
}

impl RedemptionRecord {
    /// Builds the ledger entry for redeeming `code`.
    pub fn for_code(
        user_id: UserId,
        code: &RedemptionCode,
        previous_expires_at: Option<Timestamp>,
        new_expires_at: Timestamp,
        redeemed_at: Timestamp,
    ) -> Self {
        Self {
            id: RedemptionRecordId::new(),
            user_id,
            code: code.code.clone(),
            code_type: code.tier,
            product: code.product,
            duration_days: code.duration_days,
            previous_expires_at,
            new_expires_at,
            redeemed_at,
        }
    }
}
