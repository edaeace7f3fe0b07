//! VIP Entitlements - membership time and redemption codes
//!
//! Users redeem one-time codes that extend a time-bounded entitlement
//! (VIP signals or lottery predictions). Remaining time stacks, each code is
//! consumed at most once, and a user can never redeem the same code twice.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
