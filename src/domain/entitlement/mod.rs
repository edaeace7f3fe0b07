//! Entitlement domain module.
//!
//! Time-bounded memberships and the single-use codes that extend them.
//!
//! # Module Structure
//!
//! - `window` - Is an expiry still in force at a given instant
//! - `accumulator` - Extending an expiry by a grant, with stacking
//! - `code` - Redemption codes, canonical values, and the status machine
//! - `record` - Append-only redemption ledger entries
//! - `grant` - A user's expiry plus most-recent-grant tier per product
//! - `presenter` - Display formatting for expiry dates
//! - `tier` - Grant tiers and gated products
//! - `errors` - Redemption error taxonomy

mod accumulator;
mod code;
mod errors;
mod grant;
mod presenter;
mod record;
mod tier;
mod window;

pub use accumulator::extend;
pub use code::{CodeRejection, CodeStatus, CodeValue, RedemptionCode};
pub use errors::RedemptionError;
pub use grant::UserEntitlement;
pub use presenter::{days_remaining, present, EntitlementDisplay};
pub use record::RedemptionRecord;
pub use tier::{EntitlementProduct, EntitlementTier};
pub use window::is_active;
