//! Entitlement tier and product definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Category of a time-bounded grant.
///
/// Issued on every redemption code and copied onto the ledger entry and the
/// user's entitlement row when the code is redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementTier {
    /// 30-day grant.
    Monthly,
    /// 90-day grant.
    Quarterly,
    /// 365-day grant.
    Yearly,
}

impl EntitlementTier {
    /// Number of days a code of this tier grants unless the row overrides it.
    pub fn default_duration_days(&self) -> u32 {
        match self {
            EntitlementTier::Monthly => 30,
            EntitlementTier::Quarterly => 90,
            EntitlementTier::Yearly => 365,
        }
    }

    /// Returns the storage/wire name for this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntitlementTier::Monthly => "monthly",
            EntitlementTier::Quarterly => "quarterly",
            EntitlementTier::Yearly => "yearly",
        }
    }

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            EntitlementTier::Monthly => "Monthly VIP",
            EntitlementTier::Quarterly => "Quarterly VIP",
            EntitlementTier::Yearly => "Yearly VIP",
        }
    }
}

impl std::fmt::Display for EntitlementTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntitlementTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(EntitlementTier::Monthly),
            "quarterly" => Ok(EntitlementTier::Quarterly),
            "yearly" => Ok(EntitlementTier::Yearly),
            other => Err(ValidationError::invalid_format(
                "tier",
                format!("unknown tier '{}'", other),
            )),
        }
    }
}

/// Which gated feature an entitlement belongs to.
///
/// The VIP entitlement unlocks copy-trading signals; the lottery membership
/// unlocks prediction content. Each user holds an independent expiry per product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementProduct {
    #[default]
    Vip,
    Lottery,
}

impl EntitlementProduct {
    /// Returns the storage/wire name for this product.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntitlementProduct::Vip => "vip",
            EntitlementProduct::Lottery => "lottery",
        }
    }
}

impl std::fmt::Display for EntitlementProduct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntitlementProduct {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vip" => Ok(EntitlementProduct::Vip),
            "lottery" => Ok(EntitlementProduct::Lottery),
            other => Err(ValidationError::invalid_format(
                "product",
                format!("unknown product '{}'", other),
            )),
        }
    }
}
