//! PostgreSQL adapters - Database implementations for the entitlement ports.
//!
//! - `PostgresRedemptionCodeRepository` - Code lookup, issuance, expiry finalization
//! - `PostgresEntitlementReader` - Entitlement and ledger queries
//! - `PostgresRedemptionRepository` - Transactional redemption commit
//! - `PostgresPlatformConfigSource` - Single-row platform settings

mod entitlement_reader;
mod platform_config_source;
mod redemption_code_repository;
mod redemption_repository;
mod rows;

pub use entitlement_reader::PostgresEntitlementReader;
pub use platform_config_source::PostgresPlatformConfigSource;
pub use redemption_code_repository::PostgresRedemptionCodeRepository;
pub use redemption_repository::PostgresRedemptionRepository;

use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Applies the bundled schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DomainError::new(ErrorCode::DatabaseError, format!("Migration failed: {}", e)))
}
