//! Entitlement handlers.
//!
//! ## Commands
//! - Redeeming a code for entitlement time
//! - Sweeping codes whose deadline has passed
//!
//! ## Queries
//! - Checking a code without redeeming it
//! - Current entitlement per product
//! - Redemption history

mod expire_codes;
mod get_entitlement;
mod list_redemptions;
mod redeem_code;
mod validate_code;

// Commands
pub use expire_codes::{ExpireCodesCommand, ExpireCodesHandler, ExpireCodesResult};
pub use redeem_code::{
    RedeemCodeCommand, RedeemCodeHandler, RedeemCodeResult, RedemptionSettings,
};

// Queries
pub use get_entitlement::{EntitlementView, GetEntitlementHandler, GetEntitlementQuery};
pub use list_redemptions::{
    ListRedemptionsHandler, ListRedemptionsQuery, ListRedemptionsResult, DEFAULT_HISTORY_LIMIT,
    MAX_HISTORY_LIMIT,
};
pub use validate_code::{CodeCheck, ValidateCodeHandler, ValidateCodeQuery};
