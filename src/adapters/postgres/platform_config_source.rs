//! PostgreSQL implementation of PlatformConfigSource.
//!
//! Reads the single row of `platform_config`. A missing row yields defaults.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::entitlement::EntitlementTier;
use crate::domain::foundation::DomainError;
use crate::domain::platform::PlatformConfig;
use crate::ports::PlatformConfigSource;

use super::rows::db_error;

/// PostgreSQL implementation of the PlatformConfigSource port.
pub struct PostgresPlatformConfigSource {
    pool: PgPool,
}

impl PostgresPlatformConfigSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlatformConfigRow {
    redemption_enabled: bool,
    support_contact: Option<String>,
    announcement: Option<String>,
    vip_prices: Json<BTreeMap<EntitlementTier, u32>>,
}

impl From<PlatformConfigRow> for PlatformConfig {
    fn from(row: PlatformConfigRow) -> Self {
        PlatformConfig {
            redemption_enabled: row.redemption_enabled,
            support_contact: row.support_contact,
            announcement: row.announcement,
            vip_prices: row.vip_prices.0,
        }
    }
}

#[async_trait]
impl PlatformConfigSource for PostgresPlatformConfigSource {
    async fn load(&self) -> Result<PlatformConfig, DomainError> {
        let row: Option<PlatformConfigRow> = sqlx::query_as(
            r#"
            SELECT redemption_enabled, support_contact, announcement, vip_prices
            FROM platform_config
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load platform config"))?;

        Ok(row.map(PlatformConfig::from).unwrap_or_default())
    }
}
