//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;
pub mod platform_config;

pub use handlers::{
    CodeCheck, EntitlementView, ExpireCodesCommand, ExpireCodesHandler, GetEntitlementHandler,
    GetEntitlementQuery, ListRedemptionsHandler, ListRedemptionsQuery, RedeemCodeCommand,
    RedeemCodeHandler, RedeemCodeResult, RedemptionSettings, ValidateCodeHandler,
    ValidateCodeQuery,
};
pub use platform_config::PlatformConfigCache;
