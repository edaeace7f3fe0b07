//! Platform-wide settings shown to clients.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::entitlement::EntitlementTier;

/// Settings maintained by operators and read by every client session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// When false, code redemption is refused before any lookup.
    #[serde(default = "default_redemption_enabled")]
    pub redemption_enabled: bool,

    /// Where users are sent when a redemption outcome is unclear.
    #[serde(default)]
    pub support_contact: Option<String>,

    /// Free-form banner text.
    #[serde(default)]
    pub announcement: Option<String>,

    /// Display price per tier, in minor currency units.
    #[serde(default)]
    pub vip_prices: BTreeMap<EntitlementTier, u32>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            redemption_enabled: default_redemption_enabled(),
            support_contact: None,
            announcement: None,
            vip_prices: BTreeMap::new(),
        }
    }
}

fn default_redemption_enabled() -> bool {
    true
}
