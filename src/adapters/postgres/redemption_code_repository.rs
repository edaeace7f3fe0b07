//! PostgreSQL implementation of RedemptionCodeRepository.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::domain::entitlement::{CodeValue, RedemptionCode};
use crate::domain::foundation::{DomainError, RedemptionCodeId, Timestamp};
use crate::ports::RedemptionCodeRepository;

use super::rows::{db_error, days_to_db, is_unique_violation, RedemptionCodeRow};

/// PostgreSQL implementation of the RedemptionCodeRepository port.
pub struct PostgresRedemptionCodeRepository {
    pool: PgPool,
}

impl PostgresRedemptionCodeRepository {
    /// Creates a new PostgresRedemptionCodeRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RedemptionCodeRepository for PostgresRedemptionCodeRepository {
    async fn find_by_code(&self, code: &CodeValue) -> Result<Option<RedemptionCode>, DomainError> {
        let row: Option<RedemptionCodeRow> = sqlx::query_as(
            r#"
            SELECT id, code, code_type, product, duration_days, status,
                   used_by, used_at, expires_at, created_at
            FROM redemption_codes
            WHERE code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch redemption code"))?;

        row.map(RedemptionCode::try_from).transpose()
    }

    async fn insert(&self, code: &RedemptionCode) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO redemption_codes (
                id, code, code_type, product, duration_days, status,
                used_by, used_at, expires_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(code.id.as_uuid())
        .bind(code.code.as_str())
        .bind(code.tier.as_str())
        .bind(code.product.as_str())
        .bind(days_to_db(code.duration_days)?)
        .bind(code.status.as_str())
        .bind(code.used_by.as_ref().map(|u| u.as_str()))
        .bind(code.used_at.map(|t| *t.as_datetime()))
        .bind(code.expires_at.as_datetime())
        .bind(code.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "redemption_codes_code_key") {
                return DomainError::validation("code", "Redemption code already exists");
            }
            db_error("Failed to insert redemption code")(e)
        })?;

        Ok(())
    }

    async fn finalize_expiry(
        &self,
        id: &RedemptionCodeId,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE redemption_codes
            SET status = 'expired'
            WHERE id = $1 AND status = 'active' AND expires_at <= $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to finalize code expiry"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn expire_due(&self, now: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE redemption_codes
            SET status = 'expired'
            WHERE status = 'active' AND expires_at <= $1
            "#,
        )
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to expire due codes"))?;

        debug!(rows = result.rows_affected(), "Expired due redemption codes");
        Ok(result.rows_affected())
    }
}
