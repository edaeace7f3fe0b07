//! GetEntitlementHandler - Query handler for a user's current entitlement.

use std::sync::Arc;

use chrono::FixedOffset;
use serde::Serialize;

use crate::domain::entitlement::{
    days_remaining, present, EntitlementDisplay, EntitlementProduct, EntitlementTier,
    RedemptionError, UserEntitlement,
};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::EntitlementReader;

/// Query for one product's entitlement.
#[derive(Debug, Clone)]
pub struct GetEntitlementQuery {
    pub user_id: UserId,
    pub product: EntitlementProduct,
    pub at: Timestamp,
}

/// Entitlement as shown to clients.
///
/// `current_tier` is `None` whenever the entitlement is not active, so a
/// lapsed member never shows a tier label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitlementView {
    pub user_id: UserId,
    pub product: EntitlementProduct,
    pub expires_at: Option<Timestamp>,
    pub is_active: bool,
    pub current_tier: Option<EntitlementTier>,
    pub days_remaining: u32,
    pub display: EntitlementDisplay,
}

impl EntitlementView {
    /// Builds the view of `entitlement` at `now` in the viewer's offset.
    pub fn build(entitlement: &UserEntitlement, now: Timestamp, offset: &FixedOffset) -> Self {
        Self {
            user_id: entitlement.user_id.clone(),
            product: entitlement.product,
            expires_at: entitlement.expires_at,
            is_active: entitlement.is_active(now),
            current_tier: entitlement.current_tier(now),
            days_remaining: days_remaining(entitlement.expires_at, now),
            display: present(entitlement.expires_at, now, offset),
        }
    }
}

/// Handler for entitlement lookups.
///
/// A user with no stored row is reported as never granted rather than an error.
pub struct GetEntitlementHandler {
    reader: Arc<dyn EntitlementReader>,
    display_offset: FixedOffset,
}

impl GetEntitlementHandler {
    pub fn new(reader: Arc<dyn EntitlementReader>, display_offset: FixedOffset) -> Self {
        Self {
            reader,
            display_offset,
        }
    }

    pub async fn handle(&self, query: GetEntitlementQuery) -> Result<EntitlementView, RedemptionError> {
        let entitlement = self
            .reader
            .find_entitlement(&query.user_id, query.product)
            .await?
            .unwrap_or_else(|| UserEntitlement::never_granted(query.user_id.clone(), query.product));

        Ok(EntitlementView::build(&entitlement, query.at, &self.display_offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryEntitlementStore;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn now() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 10, 19, 20, 0, 0).unwrap())
    }

    fn user() -> UserId {
        UserId::new("member-1").unwrap()
    }

    fn query(product: EntitlementProduct) -> GetEntitlementQuery {
        GetEntitlementQuery {
            user_id: user(),
            product,
            at: now(),
        }
    }

    async fn store_with(expires_at: Timestamp) -> Arc<InMemoryEntitlementStore> {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store
            .put_entitlement(UserEntitlement {
                user_id: user(),
                product: EntitlementProduct::Vip,
                expires_at: Some(expires_at),
                last_grant_tier: Some(EntitlementTier::Yearly),
                updated_at: None,
            })
            .await;
        store
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[tokio::test]
    async fn never_granted_user_is_not_activated() {
        let handler = GetEntitlementHandler::new(Arc::new(InMemoryEntitlementStore::new()), utc());

        let view = handler.handle(query(EntitlementProduct::Vip)).await.unwrap();

        assert!(!view.is_active);
        assert_eq!(view.display, EntitlementDisplay::NotActivated);
        assert_eq!(view.current_tier, None);
        assert_eq!(view.days_remaining, 0);
    }

    #[tokio::test]
    async fn active_entitlement_reports_tier_and_date() {
        let store = store_with(now().offset_by(Duration::days(10))).await;
        let handler = GetEntitlementHandler::new(store, utc());

        let view = handler.handle(query(EntitlementProduct::Vip)).await.unwrap();

        assert!(view.is_active);
        assert_eq!(view.current_tier, Some(EntitlementTier::Yearly));
        assert_eq!(view.days_remaining, 10);
        assert_eq!(
            view.display,
            EntitlementDisplay::ActiveUntil(NaiveDate::from_ymd_opt(2026, 10, 29).unwrap())
        );
    }

    #[tokio::test]
    async fn lapsed_entitlement_hides_tier() {
        let store = store_with(now().offset_by(Duration::days(-1))).await;
        let handler = GetEntitlementHandler::new(store, utc());

        let view = handler.handle(query(EntitlementProduct::Vip)).await.unwrap();

        assert!(!view.is_active);
        assert_eq!(view.current_tier, None);
        assert_eq!(view.display, EntitlementDisplay::Expired);
    }

    #[tokio::test]
    async fn display_date_uses_configured_offset() {
        let store = store_with(now().offset_by(Duration::days(10))).await;
        let plus_eight = FixedOffset::east_opt(8 * 3600).unwrap();
        let handler = GetEntitlementHandler::new(store, plus_eight);

        let view = handler.handle(query(EntitlementProduct::Vip)).await.unwrap();

        assert_eq!(
            view.display,
            EntitlementDisplay::ActiveUntil(NaiveDate::from_ymd_opt(2026, 10, 30).unwrap())
        );
    }

    #[tokio::test]
    async fn products_are_independent() {
        let store = store_with(now().offset_by(Duration::days(10))).await;
        let handler = GetEntitlementHandler::new(store, utc());

        let view = handler.handle(query(EntitlementProduct::Lottery)).await.unwrap();
        assert!(!view.is_active);
    }
}
