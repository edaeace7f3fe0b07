//! In-memory entitlement store.
//!
//! Implements every entitlement port over a single `tokio::sync::Mutex`, so a
//! commit observes and mutates all three tables under one lock. That gives the
//! same all-or-nothing behaviour the PostgreSQL adapter gets from a
//! transaction.
//!
//! Intended for tests and local development (`storage.backend = "memory"`).

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::entitlement::{
    CodeStatus, CodeValue, EntitlementProduct, RedemptionCode, RedemptionRecord, UserEntitlement,
};
use crate::domain::foundation::{DomainError, RedemptionCodeId, Timestamp, UserId};
use crate::ports::{
    CommitOutcome, EntitlementReader, RedemptionCodeRepository, RedemptionCommit,
    RedemptionRepository,
};

#[derive(Default)]
struct Tables {
    codes: HashMap<CodeValue, RedemptionCode>,
    entitlements: HashMap<(UserId, EntitlementProduct), UserEntitlement>,
    records: Vec<RedemptionRecord>,
}

/// In-memory implementation of the entitlement ports.
#[derive(Default)]
pub struct InMemoryEntitlementStore {
    tables: Mutex<Tables>,
}

impl InMemoryEntitlementStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a user's entitlement directly, bypassing redemption.
    ///
    /// Stands in for grants that arrive from payment webhooks.
    pub async fn put_entitlement(&self, entitlement: UserEntitlement) {
        let mut tables = self.tables.lock().await;
        tables.entitlements.insert(
            (entitlement.user_id.clone(), entitlement.product),
            entitlement,
        );
    }

    /// Current stored row for a code.
    pub async fn code(&self, code: &CodeValue) -> Option<RedemptionCode> {
        self.tables.lock().await.codes.get(code).cloned()
    }

    /// Number of ledger rows across all users.
    pub async fn record_count(&self) -> usize {
        self.tables.lock().await.records.len()
    }
}

fn row_by_id<'a>(
    codes: &'a mut HashMap<CodeValue, RedemptionCode>,
    id: &RedemptionCodeId,
) -> Option<&'a mut RedemptionCode> {
    codes.values_mut().find(|c| &c.id == id)
}

#[async_trait]
impl RedemptionCodeRepository for InMemoryEntitlementStore {
    async fn find_by_code(&self, code: &CodeValue) -> Result<Option<RedemptionCode>, DomainError> {
        Ok(self.tables.lock().await.codes.get(code).cloned())
    }

    async fn insert(&self, code: &RedemptionCode) -> Result<(), DomainError> {
        let mut tables = self.tables.lock().await;
        if tables.codes.contains_key(&code.code) {
            return Err(DomainError::validation("code", "Redemption code already exists"));
        }
        tables.codes.insert(code.code.clone(), code.clone());
        Ok(())
    }

    async fn finalize_expiry(
        &self,
        id: &RedemptionCodeId,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let mut tables = self.tables.lock().await;
        match row_by_id(&mut tables.codes, id) {
            Some(row) if row.status == CodeStatus::Active && !row.expires_at.is_after(&now) => {
                row.mark_expired()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn expire_due(&self, now: Timestamp) -> Result<u64, DomainError> {
        let mut tables = self.tables.lock().await;
        let mut changed = 0;
        for row in tables.codes.values_mut() {
            if row.status == CodeStatus::Active && !row.expires_at.is_after(&now) {
                row.mark_expired()?;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[async_trait]
impl EntitlementReader for InMemoryEntitlementStore {
    async fn find_entitlement(
        &self,
        user_id: &UserId,
        product: EntitlementProduct,
    ) -> Result<Option<UserEntitlement>, DomainError> {
        let tables = self.tables.lock().await;
        Ok(tables.entitlements.get(&(user_id.clone(), product)).cloned())
    }

    async fn find_record(
        &self,
        user_id: &UserId,
        code: &CodeValue,
    ) -> Result<Option<RedemptionRecord>, DomainError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .records
            .iter()
            .find(|r| &r.user_id == user_id && &r.code == code)
            .cloned())
    }

    async fn list_records(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<RedemptionRecord>, DomainError> {
        let tables = self.tables.lock().await;
        let mut records: Vec<RedemptionRecord> = tables
            .records
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));
        records.truncate(limit as usize);
        Ok(records)
    }
}

#[async_trait]
impl RedemptionRepository for InMemoryEntitlementStore {
    async fn commit(&self, commit: &RedemptionCommit) -> Result<CommitOutcome, DomainError> {
        let mut tables = self.tables.lock().await;
        let record = &commit.record;

        // Guards first; nothing is touched unless all pass.
        if tables
            .records
            .iter()
            .any(|r| r.user_id == record.user_id && r.code == record.code)
        {
            return Ok(CommitOutcome::AlreadyRedeemed);
        }

        match row_by_id(&mut tables.codes, &commit.code_id) {
            Some(row) if row.status == CodeStatus::Active => {}
            _ => return Ok(CommitOutcome::CodeUnavailable),
        }

        let key = (record.user_id.clone(), record.product);
        let stored_expiry = tables.entitlements.get(&key).and_then(|e| e.expires_at);
        if stored_expiry != record.previous_expires_at {
            return Ok(CommitOutcome::EntitlementChanged);
        }

        if let Some(row) = row_by_id(&mut tables.codes, &commit.code_id) {
            row.mark_used(record.user_id.clone(), record.redeemed_at)?;
        }

        tables.entitlements.insert(
            key,
            UserEntitlement {
                user_id: record.user_id.clone(),
                product: record.product,
                expires_at: Some(record.new_expires_at),
                last_grant_tier: Some(record.code_type),
                updated_at: Some(record.redeemed_at),
            },
        );
        tables.records.push(record.clone());

        Ok(CommitOutcome::Committed(record.clone()))
    }
}
