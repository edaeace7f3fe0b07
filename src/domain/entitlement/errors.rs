//! Redemption error taxonomy.
//!
//! Business rejections are final answers: retrying cannot change them.
//! `PersistenceFailure` and `OutcomeUnknown` are indeterminate and tell the
//! user to check their entitlement before trying again.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | InvalidCode | 400 |
//! | NotFound | 404 |
//! | AlreadyUsed | 409 |
//! | AlreadyRedeemedByUser | 409 |
//! | Expired | 410 |
//! | ProductMismatch | 422 |
//! | RedemptionDisabled | 403 |
//! | PersistenceFailure | 503 |
//! | OutcomeUnknown | 504 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

use super::tier::EntitlementProduct;

/// Errors returned by redemption and entitlement operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedemptionError {
    /// Input is not a well-formed code.
    #[error("Invalid redemption code: {0}")]
    InvalidCode(#[from] ValidationError),

    /// No code with this value exists.
    #[error("Redemption code '{0}' not found")]
    NotFound(String),

    /// The code was already consumed.
    #[error("Redemption code '{0}' has already been used")]
    AlreadyUsed(String),

    /// The code passed its deadline.
    #[error("Redemption code '{0}' has expired")]
    Expired(String),

    /// This user already redeemed this code.
    #[error("Redemption code '{0}' was already redeemed by this user")]
    AlreadyRedeemedByUser(String),

    /// The code grants a different product than requested.
    #[error("Redemption code '{code}' grants {actual}, not {requested}")]
    ProductMismatch {
        code: String,
        requested: EntitlementProduct,
        actual: EntitlementProduct,
    },

    /// Redemption is switched off by platform configuration.
    #[error("Code redemption is currently disabled")]
    RedemptionDisabled,

    /// A backend read or write failed; state may be partially known.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// The call did not complete in time; the server may or may not have applied it.
    #[error("Redemption outcome unknown after {timeout_secs}s")]
    OutcomeUnknown { timeout_secs: u64 },
}

impl RedemptionError {
    pub fn not_found(code: impl Into<String>) -> Self {
        RedemptionError::NotFound(code.into())
    }

    pub fn already_used(code: impl Into<String>) -> Self {
        RedemptionError::AlreadyUsed(code.into())
    }

    pub fn expired(code: impl Into<String>) -> Self {
        RedemptionError::Expired(code.into())
    }

    pub fn already_redeemed(code: impl Into<String>) -> Self {
        RedemptionError::AlreadyRedeemedByUser(code.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        RedemptionError::PersistenceFailure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RedemptionError::InvalidCode(_) => ErrorCode::ValidationFailed,
            RedemptionError::NotFound(_) => ErrorCode::CodeNotFound,
            RedemptionError::AlreadyUsed(_) => ErrorCode::CodeAlreadyUsed,
            RedemptionError::Expired(_) => ErrorCode::CodeExpired,
            RedemptionError::AlreadyRedeemedByUser(_) => ErrorCode::AlreadyRedeemedByUser,
            RedemptionError::ProductMismatch { .. } => ErrorCode::ProductMismatch,
            RedemptionError::RedemptionDisabled => ErrorCode::RedemptionDisabled,
            RedemptionError::PersistenceFailure(_) => ErrorCode::DatabaseError,
            RedemptionError::OutcomeUnknown { .. } => ErrorCode::Timeout,
        }
    }

    /// Message suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            RedemptionError::InvalidCode(_) | RedemptionError::NotFound(_) => {
                "This code is invalid. Please check it and try again.".to_string()
            }
            RedemptionError::AlreadyUsed(_) => "This code has already been used.".to_string(),
            RedemptionError::Expired(_) => "This code has expired.".to_string(),
            RedemptionError::AlreadyRedeemedByUser(_) => {
                "You have already redeemed this code.".to_string()
            }
            RedemptionError::ProductMismatch { actual, .. } => {
                format!("This code can only be redeemed for the {} membership.", actual)
            }
            RedemptionError::RedemptionDisabled => {
                "Code redemption is temporarily unavailable.".to_string()
            }
            RedemptionError::PersistenceFailure(_) | RedemptionError::OutcomeUnknown { .. } => {
                "We could not confirm your redemption. Please check your membership status before retrying, or contact support.".to_string()
            }
        }
    }

    /// True for clean rejections that retrying cannot change.
    pub fn is_business_rejection(&self) -> bool {
        !self.requires_status_check()
    }

    /// True when the caller must re-read server state before retrying.
    pub fn requires_status_check(&self) -> bool {
        matches!(
            self,
            RedemptionError::PersistenceFailure(_) | RedemptionError::OutcomeUnknown { .. }
        )
    }
}

impl From<DomainError> for RedemptionError {
    fn from(err: DomainError) -> Self {
        RedemptionError::PersistenceFailure(err.to_string())
    }
}

impl From<RedemptionError> for DomainError {
    fn from(err: RedemptionError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
