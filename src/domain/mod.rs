//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `entitlement` - Membership expiry rules and redemption codes
//! - `platform` - Platform-wide settings read by the client

pub mod entitlement;
pub mod foundation;
pub mod platform;
