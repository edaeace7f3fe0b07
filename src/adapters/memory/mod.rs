//! In-memory adapters for tests and local development.

mod platform_config;
mod store;

pub use platform_config::StaticPlatformConfigSource;
pub use store::InMemoryEntitlementStore;
