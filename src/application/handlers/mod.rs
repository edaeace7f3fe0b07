//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod entitlement;

pub use entitlement::{
    // Commands
    ExpireCodesCommand, ExpireCodesHandler, ExpireCodesResult,
    RedeemCodeCommand, RedeemCodeHandler, RedeemCodeResult, RedemptionSettings,
    // Queries
    CodeCheck, EntitlementView, GetEntitlementHandler, GetEntitlementQuery,
    ListRedemptionsHandler, ListRedemptionsQuery, ListRedemptionsResult,
    ValidateCodeHandler, ValidateCodeQuery,
};
