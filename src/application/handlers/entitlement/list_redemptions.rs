//! ListRedemptionsHandler - Query handler for a user's redemption history.

use std::sync::Arc;

use crate::domain::entitlement::{RedemptionError, RedemptionRecord};
use crate::domain::foundation::UserId;
use crate::ports::EntitlementReader;

/// Records returned when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;
/// Larger requested limits are clamped to this.
pub const MAX_HISTORY_LIMIT: u32 = 200;

/// Query for a user's ledger, newest first.
#[derive(Debug, Clone)]
pub struct ListRedemptionsQuery {
    pub user_id: UserId,
    pub limit: Option<u32>,
}

pub type ListRedemptionsResult = Vec<RedemptionRecord>;

/// Handler for listing redemption history.
pub struct ListRedemptionsHandler {
    reader: Arc<dyn EntitlementReader>,
}

impl ListRedemptionsHandler {
    pub fn new(reader: Arc<dyn EntitlementReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: ListRedemptionsQuery,
    ) -> Result<ListRedemptionsResult, RedemptionError> {
        let limit = match query.limit {
            None | Some(0) => DEFAULT_HISTORY_LIMIT,
            Some(limit) => limit.min(MAX_HISTORY_LIMIT),
        };

        Ok(self.reader.list_records(&query.user_id, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::{CodeValue, EntitlementProduct, UserEntitlement};
    use crate::domain::foundation::{DomainError, ErrorCode};
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementation
    // ════════════════════════════════════════════════════════════════════════════

    #[derive(Default)]
    struct RecordingReader {
        requested_limits: Mutex<Vec<u32>>,
        fail: bool,
    }

    #[async_trait]
    impl EntitlementReader for RecordingReader {
        async fn find_entitlement(
            &self,
            _: &UserId,
            _: EntitlementProduct,
        ) -> Result<Option<UserEntitlement>, DomainError> {
            Ok(None)
        }

        async fn find_record(
            &self,
            _: &UserId,
            _: &CodeValue,
        ) -> Result<Option<RedemptionRecord>, DomainError> {
            Ok(None)
        }

        async fn list_records(
            &self,
            _: &UserId,
            limit: u32,
        ) -> Result<Vec<RedemptionRecord>, DomainError> {
            if self.fail {
                return Err(DomainError::new(ErrorCode::DatabaseError, "Simulated read failure"));
            }
            self.requested_limits.lock().unwrap().push(limit);
            Ok(vec![])
        }
    }

    fn query(limit: Option<u32>) -> ListRedemptionsQuery {
        ListRedemptionsQuery {
            user_id: UserId::new("member-1").unwrap(),
            limit,
        }
    }

    #[tokio::test]
    async fn default_limit_is_applied() {
        let reader = Arc::new(RecordingReader::default());
        let handler = ListRedemptionsHandler::new(reader.clone());

        handler.handle(query(None)).await.unwrap();
        handler.handle(query(Some(MAX_HISTORY_LIMIT))).await.unwrap();

        assert_eq!(
            *reader.requested_limits.lock().unwrap(),
            vec![DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT]
        );
    }

    #[tokio::test]
    async fn out_of_range_limits_are_clamped() {
        let reader = Arc::new(RecordingReader::default());
        let handler = ListRedemptionsHandler::new(reader.clone());

        handler.handle(query(Some(0))).await.unwrap();
        handler.handle(query(Some(10_000))).await.unwrap();

        assert_eq!(
            *reader.requested_limits.lock().unwrap(),
            vec![DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT]
        );
    }

    #[tokio::test]
    async fn read_failure_is_persistence_failure() {
        let reader = Arc::new(RecordingReader {
            fail: true,
            ..RecordingReader::default()
        });
        let handler = ListRedemptionsHandler::new(reader);

        let err = handler.handle(query(None)).await.unwrap_err();
        assert!(matches!(err, RedemptionError::PersistenceFailure(_)));
    }
}
