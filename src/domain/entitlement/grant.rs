//! A user's entitlement for one product.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

use super::tier::{EntitlementProduct, EntitlementTier};
use super::window::is_active;

/// Expiry and most-recent-grant tier for one (user, product) pair.
///
/// The tier is only meaningful together with the expiry. Both are written in
/// the same statement, and [`UserEntitlement::current_tier`] hides the tier
/// once the expiry has passed, so no stale label is ever reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntitlement {
    pub user_id: UserId,
    pub product: EntitlementProduct,
    pub expires_at: Option<Timestamp>,
    pub last_grant_tier: Option<EntitlementTier>,
    pub updated_at: Option<Timestamp>,
}

impl UserEntitlement {
    /// The implicit state of a user who has never been granted anything.
    pub fn never_granted(user_id: UserId, product: EntitlementProduct) -> Self {
        Self {
            user_id,
            product,
            expires_at: None,
            last_grant_tier: None,
            updated_at: None,
        }
    }

    /// Returns true while the entitlement is in force.
    pub fn is_active(&self, now: Timestamp) -> bool {
        is_active(self.expires_at, now)
    }

    /// Tier of the most recent grant, reported only while active.
    pub fn current_tier(&self, now: Timestamp) -> Option<EntitlementTier> {
        if self.is_active(now) {
            self.last_grant_tier
        } else {
            None
        }
    }
}
