//! PostgreSQL implementation of EntitlementReader.
//!
//! Provides read queries for user entitlements and the redemption ledger.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entitlement::{
    CodeValue, EntitlementProduct, RedemptionRecord, UserEntitlement,
};
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::EntitlementReader;

use super::rows::{db_error, RedemptionRecordRow, UserEntitlementRow};

/// PostgreSQL implementation of the EntitlementReader port.
pub struct PostgresEntitlementReader {
    pool: PgPool,
}

impl PostgresEntitlementReader {
    /// Creates a new PostgresEntitlementReader with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntitlementReader for PostgresEntitlementReader {
    async fn find_entitlement(
        &self,
        user_id: &UserId,
        product: EntitlementProduct,
    ) -> Result<Option<UserEntitlement>, DomainError> {
        let row: Option<UserEntitlementRow> = sqlx::query_as(
            r#"
            SELECT user_id, product, expires_at, last_grant_tier, updated_at
            FROM user_entitlements
            WHERE user_id = $1 AND product = $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(product.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch entitlement"))?;

        row.map(UserEntitlement::try_from).transpose()
    }

    async fn find_record(
        &self,
        user_id: &UserId,
        code: &CodeValue,
    ) -> Result<Option<RedemptionRecord>, DomainError> {
        let row: Option<RedemptionRecordRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, code, code_type, product, duration_days,
                   previous_expires_at, new_expires_at, redeemed_at
            FROM redemption_records
            WHERE user_id = $1 AND code = $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch redemption record"))?;

        row.map(RedemptionRecord::try_from).transpose()
    }

    async fn list_records(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<RedemptionRecord>, DomainError> {
        let rows: Vec<RedemptionRecordRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, code, code_type, product, duration_days,
                   previous_expires_at, new_expires_at, redeemed_at
            FROM redemption_records
            WHERE user_id = $1
            ORDER BY redeemed_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list redemption records"))?;

        rows.into_iter().map(RedemptionRecord::try_from).collect()
    }
}
