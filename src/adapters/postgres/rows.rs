//! Row types and column conversions shared by the PostgreSQL adapters.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entitlement::{
    CodeStatus, CodeValue, EntitlementProduct, EntitlementTier, RedemptionCode, RedemptionRecord,
    UserEntitlement,
};
use crate::domain::foundation::{
    DomainError, ErrorCode, RedemptionCodeId, RedemptionRecordId, Timestamp, UserId,
};

/// Database row representation of a redemption code.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct RedemptionCodeRow {
    pub id: Uuid,
    pub code: String,
    pub code_type: String,
    pub product: String,
    pub duration_days: i32,
    pub status: String,
    pub used_by: Option<String>,
    pub used_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RedemptionCodeRow> for RedemptionCode {
    type Error = DomainError;

    fn try_from(row: RedemptionCodeRow) -> Result<Self, Self::Error> {
        Ok(RedemptionCode {
            id: RedemptionCodeId::from_uuid(row.id),
            code: parse_code(&row.code)?,
            tier: parse_tier(&row.code_type)?,
            product: parse_product(&row.product)?,
            duration_days: parse_days(row.duration_days)?,
            status: row.status.parse::<CodeStatus>().map_err(corrupt("status"))?,
            used_by: row.used_by.map(|u| parse_user_id(&u)).transpose()?,
            used_at: row.used_at.map(Timestamp::from_datetime),
            expires_at: Timestamp::from_datetime(row.expires_at),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

/// Database row representation of a user's entitlement.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct UserEntitlementRow {
    pub user_id: String,
    pub product: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_grant_tier: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserEntitlementRow> for UserEntitlement {
    type Error = DomainError;

    fn try_from(row: UserEntitlementRow) -> Result<Self, Self::Error> {
        Ok(UserEntitlement {
            user_id: parse_user_id(&row.user_id)?,
            product: parse_product(&row.product)?,
            expires_at: row.expires_at.map(Timestamp::from_datetime),
            last_grant_tier: row.last_grant_tier.as_deref().map(parse_tier).transpose()?,
            updated_at: row.updated_at.map(Timestamp::from_datetime),
        })
    }
}

/// Database row representation of a ledger entry.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct RedemptionRecordRow {
    pub id: Uuid,
    pub user_id: String,
    pub code: String,
    pub code_type: String,
    pub product: String,
    pub duration_days: i32,
    pub previous_expires_at: Option<DateTime<Utc>>,
    pub new_expires_at: DateTime<Utc>,
    pub redeemed_at: DateTime<Utc>,
}

impl TryFrom<RedemptionRecordRow> for RedemptionRecord {
    type Error = DomainError;

    fn try_from(row: RedemptionRecordRow) -> Result<Self, Self::Error> {
        Ok(RedemptionRecord {
            id: RedemptionRecordId::from_uuid(row.id),
            user_id: parse_user_id(&row.user_id)?,
            code: parse_code(&row.code)?,
            code_type: parse_tier(&row.code_type)?,
            product: parse_product(&row.product)?,
            duration_days: parse_days(row.duration_days)?,
            previous_expires_at: row.previous_expires_at.map(Timestamp::from_datetime),
            new_expires_at: Timestamp::from_datetime(row.new_expires_at),
            redeemed_at: Timestamp::from_datetime(row.redeemed_at),
        })
    }
}

fn corrupt<E: std::fmt::Display>(column: &'static str) -> impl Fn(E) -> DomainError {
    move |e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid {} value: {}", column, e),
        )
    }
}

fn parse_code(s: &str) -> Result<CodeValue, DomainError> {
    CodeValue::parse(s).map_err(corrupt("code"))
}

pub(super) fn parse_tier(s: &str) -> Result<EntitlementTier, DomainError> {
    s.parse().map_err(corrupt("code_type"))
}

pub(super) fn parse_product(s: &str) -> Result<EntitlementProduct, DomainError> {
    s.parse().map_err(corrupt("product"))
}

fn parse_user_id(s: &str) -> Result<UserId, DomainError> {
    UserId::new(s).map_err(corrupt("user_id"))
}

fn parse_days(days: i32) -> Result<u32, DomainError> {
    u32::try_from(days).map_err(corrupt("duration_days"))
}

/// Converts a day count for an INTEGER column.
pub(super) fn days_to_db(days: u32) -> Result<i32, DomainError> {
    i32::try_from(days).map_err(|_| {
        DomainError::validation("duration_days", format!("{} does not fit the column", days))
    })
}

/// Maps a sqlx error to a `DomainError` with context.
pub(super) fn db_error(context: &str) -> impl Fn(sqlx::Error) -> DomainError + '_ {
    move |e| DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

/// True when `err` is a violation of the named unique constraint.
pub(super) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}
