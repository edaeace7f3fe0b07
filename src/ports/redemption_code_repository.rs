//! Redemption code repository port.
//!
//! Lookup and lifecycle writes for issued codes. Consuming a code is not
//! here: that happens inside [`RedemptionRepository::commit`] so it can share
//! a transaction with the entitlement update and the ledger insert.
//!
//! [`RedemptionRepository::commit`]: super::RedemptionRepository::commit

use async_trait::async_trait;

use crate::domain::entitlement::{CodeValue, RedemptionCode};
use crate::domain::foundation::{DomainError, RedemptionCodeId, Timestamp};

/// Repository port for redemption codes.
#[async_trait]
pub trait RedemptionCodeRepository: Send + Sync {
    /// Find a code by its canonical value.
    ///
    /// Returns `None` if no such code was issued.
    async fn find_by_code(&self, code: &CodeValue) -> Result<Option<RedemptionCode>, DomainError>;

    /// Store a newly issued code.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the code value already exists
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, code: &RedemptionCode) -> Result<(), DomainError>;

    /// Persist `active → expired` for one code whose deadline has passed.
    ///
    /// Conditional on the stored row still being `active` with
    /// `expires_at <= now`; returns whether a row changed. Calling it twice is
    /// harmless.
    async fn finalize_expiry(&self, id: &RedemptionCodeId, now: Timestamp)
        -> Result<bool, DomainError>;

    /// Persist `active → expired` for every code past its deadline.
    ///
    /// Returns the number of codes changed.
    async fn expire_due(&self, now: Timestamp) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redemption_code_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn RedemptionCodeRepository) {}
    }
}
