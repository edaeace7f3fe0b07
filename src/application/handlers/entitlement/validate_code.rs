//! ValidateCodeHandler - Query handler for checking a code without redeeming it.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::entitlement::{
    CodeRejection, CodeValue, EntitlementProduct, EntitlementTier, RedemptionError,
};
use crate::domain::foundation::Timestamp;
use crate::ports::RedemptionCodeRepository;

/// Query to check whether a code is currently redeemable.
#[derive(Debug, Clone)]
pub struct ValidateCodeQuery {
    pub code: String,
    pub checked_at: Timestamp,
}

/// What a redeemable code would grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeCheck {
    pub code: CodeValue,
    pub tier: EntitlementTier,
    pub product: EntitlementProduct,
    pub duration_days: u32,
    pub expires_at: Timestamp,
}

/// Handler for read-only code checks.
///
/// Never writes. A code that is past its deadline but still stored as active
/// is reported as expired and left for the redemption path or the sweep to
/// finalize.
pub struct ValidateCodeHandler {
    codes: Arc<dyn RedemptionCodeRepository>,
}

impl ValidateCodeHandler {
    pub fn new(codes: Arc<dyn RedemptionCodeRepository>) -> Self {
        Self { codes }
    }

    pub async fn handle(&self, query: ValidateCodeQuery) -> Result<CodeCheck, RedemptionError> {
        let code = CodeValue::parse(&query.code)?;
        let stored = self
            .codes
            .find_by_code(&code)
            .await?
            .ok_or_else(|| RedemptionError::not_found(code.as_str()))?;

        match stored.evaluate(query.checked_at) {
            Ok(()) => Ok(CodeCheck {
                code: stored.code,
                tier: stored.tier,
                product: stored.product,
                duration_days: stored.duration_days,
                expires_at: stored.expires_at,
            }),
            Err(CodeRejection::AlreadyUsed) => Err(RedemptionError::already_used(code.as_str())),
            Err(CodeRejection::Expired | CodeRejection::ExpiredUnmarked) => {
                Err(RedemptionError::expired(code.as_str()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryEntitlementStore;
    use crate::domain::entitlement::{CodeStatus, RedemptionCode};
    use crate::domain::foundation::{DomainError, ErrorCode, RedemptionCodeId, UserId};
    use async_trait::async_trait;
    use chrono::Duration;

    fn now() -> Timestamp {
        Timestamp::from_unix_millis(1_790_000_000_000).unwrap()
    }

    fn issue(value: &str, expires_in_days: i64) -> RedemptionCode {
        RedemptionCode::issue(
            CodeValue::parse(value).unwrap(),
            EntitlementTier::Quarterly,
            EntitlementProduct::Vip,
            now().offset_by(Duration::days(expires_in_days)),
            now().offset_by(Duration::days(-1)),
        )
    }

    fn query(code: &str) -> ValidateCodeQuery {
        ValidateCodeQuery {
            code: code.to_string(),
            checked_at: now(),
        }
    }

    #[tokio::test]
    async fn active_code_reports_its_grant() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.insert(&issue("QTR-001", 10)).await.unwrap();
        let handler = ValidateCodeHandler::new(store);

        let check = handler.handle(query("qtr-001")).await.unwrap();

        assert_eq!(check.tier, EntitlementTier::Quarterly);
        assert_eq!(check.duration_days, 90);
    }

    #[tokio::test]
    async fn stale_code_is_expired_but_not_written() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        let code = issue("OLD-001", -1);
        store.insert(&code).await.unwrap();
        let handler = ValidateCodeHandler::new(store.clone());

        let first = handler.handle(query("OLD-001")).await.unwrap_err();
        let second = handler.handle(query("OLD-001")).await.unwrap_err();

        assert_eq!(first, RedemptionError::expired("OLD-001"));
        assert_eq!(first, second);
        assert_eq!(store.code(&code.code).await.unwrap().status, CodeStatus::Active);
    }

    #[tokio::test]
    async fn used_code_is_rejected() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        let mut code = issue("USED-01", 10);
        code.mark_used(UserId::new("someone").unwrap(), now()).unwrap();
        store.insert(&code).await.unwrap();
        let handler = ValidateCodeHandler::new(store);

        let err = handler.handle(query("USED-01")).await.unwrap_err();
        assert_eq!(err, RedemptionError::already_used("USED-01"));
    }

    #[tokio::test]
    async fn unknown_and_malformed_codes() {
        let handler = ValidateCodeHandler::new(Arc::new(InMemoryEntitlementStore::new()));

        assert_eq!(
            handler.handle(query("MISSING")).await.unwrap_err(),
            RedemptionError::not_found("MISSING")
        );
        assert!(matches!(
            handler.handle(query("")).await.unwrap_err(),
            RedemptionError::InvalidCode(_)
        ));
    }

    struct FailingCodes;

    #[async_trait]
    impl RedemptionCodeRepository for FailingCodes {
        async fn find_by_code(&self, _: &CodeValue) -> Result<Option<RedemptionCode>, DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "Simulated read failure"))
        }

        async fn insert(&self, _: &RedemptionCode) -> Result<(), DomainError> {
            Ok(())
        }

        async fn finalize_expiry(&self, _: &RedemptionCodeId, _: Timestamp) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn expire_due(&self, _: Timestamp) -> Result<u64, DomainError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn lookup_failure_is_persistence_failure() {
        let handler = ValidateCodeHandler::new(Arc::new(FailingCodes));
        let err = handler.handle(query("ABC123")).await.unwrap_err();
        assert!(matches!(err, RedemptionError::PersistenceFailure(_)));
    }
}
