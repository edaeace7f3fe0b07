//! Entitlement reader port (read side).
//!
//! Queries over user entitlements and the redemption ledger.

use async_trait::async_trait;

use crate::domain::entitlement::{CodeValue, EntitlementProduct, RedemptionRecord, UserEntitlement};
use crate::domain::foundation::{DomainError, UserId};

/// Reader port for entitlement and ledger queries.
#[async_trait]
pub trait EntitlementReader: Send + Sync {
    /// Current entitlement of a user for one product.
    ///
    /// Returns `None` if the user was never granted this product.
    async fn find_entitlement(
        &self,
        user_id: &UserId,
        product: EntitlementProduct,
    ) -> Result<Option<UserEntitlement>, DomainError>;

    /// The ledger entry for (user, code), if the user redeemed it.
    async fn find_record(
        &self,
        user_id: &UserId,
        code: &CodeValue,
    ) -> Result<Option<RedemptionRecord>, DomainError>;

    /// A user's ledger, newest first, at most `limit` entries.
    async fn list_records(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<RedemptionRecord>, DomainError>;
}
