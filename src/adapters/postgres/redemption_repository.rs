//! PostgreSQL implementation of RedemptionRepository.
//!
//! A redemption is one transaction with three guarded writes. Any guard that
//! fails rolls the whole transaction back, so the code, the entitlement and
//! the ledger never disagree.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use crate::domain::foundation::DomainError;
use crate::ports::{CommitOutcome, RedemptionCommit, RedemptionRepository};

use super::rows::{db_error, days_to_db, is_unique_violation};

const LEDGER_UNIQUE: &str = "redemption_records_user_code_key";

/// PostgreSQL implementation of the RedemptionRepository port.
pub struct PostgresRedemptionRepository {
    pool: PgPool,
}

impl PostgresRedemptionRepository {
    /// Creates a new PostgresRedemptionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn rollback(
    tx: Transaction<'_, Postgres>,
    outcome: CommitOutcome,
) -> Result<CommitOutcome, DomainError> {
    tx.rollback()
        .await
        .map_err(db_error("Failed to roll back redemption"))?;
    Ok(outcome)
}

#[async_trait]
impl RedemptionRepository for PostgresRedemptionRepository {
    async fn commit(&self, commit: &RedemptionCommit) -> Result<CommitOutcome, DomainError> {
        let record = &commit.record;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        // 1. Consume the code only if nobody else has
        let consumed = sqlx::query(
            r#"
            UPDATE redemption_codes
            SET status = 'used', used_by = $2, used_at = $3
            WHERE id = $1 AND status = 'active' AND expires_at > $3
            "#,
        )
        .bind(commit.code_id.as_uuid())
        .bind(record.user_id.as_str())
        .bind(record.redeemed_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to consume redemption code"))?;

        if consumed.rows_affected() == 0 {
            debug!(code = %record.code, "Code no longer active at commit");
            return rollback(tx, CommitOutcome::CodeUnavailable).await;
        }

        // 2. Compare-and-set the expiry against the value the grant was computed from
        let applied = match record.previous_expires_at {
            None => sqlx::query(
                r#"
                INSERT INTO user_entitlements (user_id, product, expires_at, last_grant_tier, updated_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id, product) DO UPDATE
                SET expires_at = EXCLUDED.expires_at,
                    last_grant_tier = EXCLUDED.last_grant_tier,
                    updated_at = EXCLUDED.updated_at
                WHERE user_entitlements.expires_at IS NULL
                "#,
            )
            .bind(record.user_id.as_str())
            .bind(record.product.as_str())
            .bind(record.new_expires_at.as_datetime())
            .bind(record.code_type.as_str())
            .bind(record.redeemed_at.as_datetime())
            .execute(&mut *tx)
            .await,
            Some(previous) => sqlx::query(
                r#"
                UPDATE user_entitlements
                SET expires_at = $3, last_grant_tier = $4, updated_at = $5
                WHERE user_id = $1 AND product = $2 AND expires_at = $6
                "#,
            )
            .bind(record.user_id.as_str())
            .bind(record.product.as_str())
            .bind(record.new_expires_at.as_datetime())
            .bind(record.code_type.as_str())
            .bind(record.redeemed_at.as_datetime())
            .bind(previous.as_datetime())
            .execute(&mut *tx)
            .await,
        }
        .map_err(db_error("Failed to update entitlement"))?;

        if applied.rows_affected() == 0 {
            debug!(user_id = %record.user_id, "Entitlement changed since it was read");
            return rollback(tx, CommitOutcome::EntitlementChanged).await;
        }

        // 3. Append to the ledger; the unique index rejects a second redemption
        let inserted = sqlx::query(
            r#"
            INSERT INTO redemption_records (
                id, user_id, code, code_type, product, duration_days,
                previous_expires_at, new_expires_at, redeemed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.as_str())
        .bind(record.code.as_str())
        .bind(record.code_type.as_str())
        .bind(record.product.as_str())
        .bind(days_to_db(record.duration_days)?)
        .bind(record.previous_expires_at.map(|t| *t.as_datetime()))
        .bind(record.new_expires_at.as_datetime())
        .bind(record.redeemed_at.as_datetime())
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e, LEDGER_UNIQUE) => {
                return rollback(tx, CommitOutcome::AlreadyRedeemed).await;
            }
            Err(e) => return Err(db_error("Failed to insert redemption record")(e)),
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit redemption"))?;

        Ok(CommitOutcome::Committed(record.clone()))
    }
}
