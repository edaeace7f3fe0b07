//! Redemption repository port (write side).
//!
//! A redemption has three effects: the user's expiry and tier move forward,
//! the code becomes `used`, and a ledger row is appended. Implementations
//! must apply all three or none.
//!
//! # Guards
//!
//! Every commit is checked against the state the handler read:
//!
//! - the code row must still be `active` (conditional update), otherwise
//!   [`CommitOutcome::CodeUnavailable`]
//! - no ledger row may exist for (user, code) (unique index), otherwise
//!   [`CommitOutcome::AlreadyRedeemed`]
//! - the user's stored expiry must still equal `record.previous_expires_at`
//!   (compare-and-set), otherwise [`CommitOutcome::EntitlementChanged`]

use async_trait::async_trait;

use crate::domain::entitlement::RedemptionRecord;
use crate::domain::foundation::{DomainError, RedemptionCodeId};

/// Everything needed to apply one redemption atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionCommit {
    /// Row id of the code being consumed.
    pub code_id: RedemptionCodeId,
    /// Ledger entry to append. Also carries the expected previous expiry,
    /// the new expiry, the tier, and the product.
    pub record: RedemptionRecord,
}

/// Result of a commit attempt. Nothing is written unless `Committed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// All three effects applied.
    Committed(RedemptionRecord),
    /// The code stopped being `active` after it was read.
    CodeUnavailable,
    /// A ledger row for (user, code) already exists.
    AlreadyRedeemed,
    /// The user's expiry changed after it was read; recompute and retry.
    EntitlementChanged,
}

/// Repository port for applying redemptions.
#[async_trait]
pub trait RedemptionRepository: Send + Sync {
    /// Apply a redemption atomically.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` / `ExternalServiceError` on infrastructure failure;
    ///   the transaction is rolled back, but the caller cannot assume the
    ///   request never reached the backend.
    async fn commit(&self, commit: &RedemptionCommit) -> Result<CommitOutcome, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redemption_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn RedemptionRepository) {}
    }
}
