//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Entitlement Ports
//!
//! - `RedemptionCodeRepository` - Code lookup, issuance, expiry finalization
//! - `EntitlementReader` - User entitlements and the redemption ledger
//! - `RedemptionRepository` - Atomic application of a redemption
//!
//! ## Platform Ports
//!
//! - `PlatformConfigSource` - Operator-maintained platform settings

mod entitlement_reader;
mod platform_config_source;
mod redemption_code_repository;
mod redemption_repository;

pub use entitlement_reader::EntitlementReader;
pub use platform_config_source::PlatformConfigSource;
pub use redemption_code_repository::RedemptionCodeRepository;
pub use redemption_repository::{CommitOutcome, RedemptionCommit, RedemptionRepository};
