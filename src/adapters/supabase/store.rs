//! Supabase-backed entitlement store.
//!
//! Reads go through PostgREST table endpoints. The redemption commit calls the
//! `commit_redemption` database function so all three writes happen in one
//! server-side transaction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::domain::entitlement::{
    CodeStatus, CodeValue, EntitlementProduct, EntitlementTier, RedemptionCode, RedemptionRecord,
    UserEntitlement,
};
use crate::domain::foundation::{
    DomainError, ErrorCode, RedemptionCodeId, RedemptionRecordId, Timestamp, UserId,
};
use crate::domain::platform::PlatformConfig;
use crate::ports::{
    CommitOutcome, EntitlementReader, PlatformConfigSource, RedemptionCodeRepository,
    RedemptionCommit, RedemptionRepository,
};

use super::client::SupabaseClient;

const CODES: &str = "redemption_codes";
const ENTITLEMENTS: &str = "user_entitlements";
const RECORDS: &str = "redemption_records";
const PLATFORM: &str = "platform_config";

/// Entitlement ports over a Supabase project.
pub struct SupabaseEntitlementStore {
    client: SupabaseClient,
}

impl SupabaseEntitlementStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Wire rows
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize, Deserialize)]
struct CodeRow {
    id: Uuid,
    code: String,
    code_type: EntitlementTier,
    product: EntitlementProduct,
    duration_days: u32,
    status: CodeStatus,
    used_by: Option<String>,
    used_at: Option<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CodeRow> for RedemptionCode {
    type Error = DomainError;

    fn try_from(row: CodeRow) -> Result<Self, Self::Error> {
        Ok(RedemptionCode {
            id: RedemptionCodeId::from_uuid(row.id),
            code: CodeValue::parse(&row.code).map_err(corrupt)?,
            tier: row.code_type,
            product: row.product,
            duration_days: row.duration_days,
            status: row.status,
            used_by: row.used_by.map(UserId::new).transpose().map_err(corrupt)?,
            used_at: row.used_at.map(Timestamp::from_datetime),
            expires_at: Timestamp::from_datetime(row.expires_at),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

impl From<&RedemptionCode> for CodeRow {
    fn from(code: &RedemptionCode) -> Self {
        Self {
            id: *code.id.as_uuid(),
            code: code.code.to_string(),
            code_type: code.tier,
            product: code.product,
            duration_days: code.duration_days,
            status: code.status,
            used_by: code.used_by.as_ref().map(|u| u.to_string()),
            used_at: code.used_at.map(|t| *t.as_datetime()),
            expires_at: *code.expires_at.as_datetime(),
            created_at: *code.created_at.as_datetime(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EntitlementRow {
    user_id: String,
    product: EntitlementProduct,
    expires_at: Option<DateTime<Utc>>,
    last_grant_tier: Option<EntitlementTier>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<EntitlementRow> for UserEntitlement {
    type Error = DomainError;

    fn try_from(row: EntitlementRow) -> Result<Self, Self::Error> {
        Ok(UserEntitlement {
            user_id: UserId::new(row.user_id).map_err(corrupt)?,
            product: row.product,
            expires_at: row.expires_at.map(Timestamp::from_datetime),
            last_grant_tier: row.last_grant_tier,
            updated_at: row.updated_at.map(Timestamp::from_datetime),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RecordRow {
    id: Uuid,
    user_id: String,
    code: String,
    code_type: EntitlementTier,
    product: EntitlementProduct,
    duration_days: u32,
    previous_expires_at: Option<DateTime<Utc>>,
    new_expires_at: DateTime<Utc>,
    redeemed_at: DateTime<Utc>,
}

impl TryFrom<RecordRow> for RedemptionRecord {
    type Error = DomainError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        Ok(RedemptionRecord {
            id: RedemptionRecordId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(corrupt)?,
            code: CodeValue::parse(&row.code).map_err(corrupt)?,
            code_type: row.code_type,
            product: row.product,
            duration_days: row.duration_days,
            previous_expires_at: row.previous_expires_at.map(Timestamp::from_datetime),
            new_expires_at: Timestamp::from_datetime(row.new_expires_at),
            redeemed_at: Timestamp::from_datetime(row.redeemed_at),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PlatformRow {
    redemption_enabled: bool,
    support_contact: Option<String>,
    announcement: Option<String>,
    #[serde(default)]
    vip_prices: BTreeMap<EntitlementTier, u32>,
}

/// Arguments of the `commit_redemption` database function.
#[derive(Debug, Serialize)]
struct CommitArgs {
    p_record_id: Uuid,
    p_code_id: Uuid,
    p_user_id: String,
    p_code: String,
    p_code_type: EntitlementTier,
    p_product: EntitlementProduct,
    p_duration_days: u32,
    p_previous_expires_at: Option<DateTime<Utc>>,
    p_new_expires_at: DateTime<Utc>,
    p_redeemed_at: DateTime<Utc>,
}

impl From<&RedemptionCommit> for CommitArgs {
    fn from(commit: &RedemptionCommit) -> Self {
        let record = &commit.record;
        Self {
            p_record_id: *record.id.as_uuid(),
            p_code_id: *commit.code_id.as_uuid(),
            p_user_id: record.user_id.to_string(),
            p_code: record.code.to_string(),
            p_code_type: record.code_type,
            p_product: record.product,
            p_duration_days: record.duration_days,
            p_previous_expires_at: record.previous_expires_at.map(|t| *t.as_datetime()),
            p_new_expires_at: *record.new_expires_at.as_datetime(),
            p_redeemed_at: *record.redeemed_at.as_datetime(),
        }
    }
}

fn corrupt<E: std::fmt::Display>(e: E) -> DomainError {
    DomainError::new(ErrorCode::ExternalServiceError, format!("Invalid row from Supabase: {}", e))
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

fn instant(at: Timestamp) -> String {
    at.as_datetime().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Maps the function's result label to a commit outcome.
fn outcome_from_label(label: &str, record: &RedemptionRecord) -> Result<CommitOutcome, DomainError> {
    match label {
        "committed" => Ok(CommitOutcome::Committed(record.clone())),
        "code_unavailable" => Ok(CommitOutcome::CodeUnavailable),
        "already_redeemed" => Ok(CommitOutcome::AlreadyRedeemed),
        "entitlement_changed" => Ok(CommitOutcome::EntitlementChanged),
        other => Err(corrupt(format!("unknown commit outcome '{}'", other))),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Port implementations
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl RedemptionCodeRepository for SupabaseEntitlementStore {
    async fn find_by_code(&self, code: &CodeValue) -> Result<Option<RedemptionCode>, DomainError> {
        let rows: Vec<CodeRow> = self
            .client
            .select(CODES, &[("code", eq(code)), ("select", "*".to_string())])
            .await?;
        rows.into_iter().next().map(RedemptionCode::try_from).transpose()
    }

    async fn insert(&self, code: &RedemptionCode) -> Result<(), DomainError> {
        self.client.insert(CODES, &CodeRow::from(code)).await
    }

    async fn finalize_expiry(
        &self,
        id: &RedemptionCodeId,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let rows: Vec<IgnoredAny> = self
            .client
            .update(
                CODES,
                &[
                    ("id", eq(id)),
                    ("status", eq("active")),
                    ("expires_at", format!("lte.{}", instant(now))),
                    ("select", "id".to_string()),
                ],
                &serde_json::json!({ "status": "expired" }),
            )
            .await?;
        Ok(!rows.is_empty())
    }

    async fn expire_due(&self, now: Timestamp) -> Result<u64, DomainError> {
        let rows: Vec<IgnoredAny> = self
            .client
            .update(
                CODES,
                &[
                    ("status", eq("active")),
                    ("expires_at", format!("lte.{}", instant(now))),
                    ("select", "id".to_string()),
                ],
                &serde_json::json!({ "status": "expired" }),
            )
            .await?;
        debug!(rows = rows.len(), "Expired due redemption codes");
        Ok(rows.len() as u64)
    }
}

#[async_trait]
impl EntitlementReader for SupabaseEntitlementStore {
    async fn find_entitlement(
        &self,
        user_id: &UserId,
        product: EntitlementProduct,
    ) -> Result<Option<UserEntitlement>, DomainError> {
        let rows: Vec<EntitlementRow> = self
            .client
            .select(
                ENTITLEMENTS,
                &[
                    ("user_id", eq(user_id)),
                    ("product", eq(product)),
                    ("select", "*".to_string()),
                ],
            )
            .await?;
        rows.into_iter().next().map(UserEntitlement::try_from).transpose()
    }

    async fn find_record(
        &self,
        user_id: &UserId,
        code: &CodeValue,
    ) -> Result<Option<RedemptionRecord>, DomainError> {
        let rows: Vec<RecordRow> = self
            .client
            .select(
                RECORDS,
                &[
                    ("user_id", eq(user_id)),
                    ("code", eq(code)),
                    ("select", "*".to_string()),
                ],
            )
            .await?;
        rows.into_iter().next().map(RedemptionRecord::try_from).transpose()
    }

    async fn list_records(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<RedemptionRecord>, DomainError> {
        let rows: Vec<RecordRow> = self
            .client
            .select(
                RECORDS,
                &[
                    ("user_id", eq(user_id)),
                    ("order", "redeemed_at.desc".to_string()),
                    ("limit", limit.to_string()),
                    ("select", "*".to_string()),
                ],
            )
            .await?;
        rows.into_iter().map(RedemptionRecord::try_from).collect()
    }
}

#[async_trait]
impl RedemptionRepository for SupabaseEntitlementStore {
    async fn commit(&self, commit: &RedemptionCommit) -> Result<CommitOutcome, DomainError> {
        let label: String = self
            .client
            .rpc("commit_redemption", &CommitArgs::from(commit))
            .await?;
        outcome_from_label(&label, &commit.record)
    }
}

#[async_trait]
impl PlatformConfigSource for SupabaseEntitlementStore {
    async fn load(&self) -> Result<PlatformConfig, DomainError> {
        let rows: Vec<PlatformRow> = self
            .client
            .select(PLATFORM, &[("id", eq(1)), ("select", "*".to_string())])
            .await?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| PlatformConfig {
                redemption_enabled: row.redemption_enabled,
                support_contact: row.support_contact,
                announcement: row.announcement,
                vip_prices: row.vip_prices,
            })
            .unwrap_or_default())
    }
}
