//! Redemption codes.
//!
//! A redemption code is a single-use token that extends a user's entitlement
//! by a fixed number of days. Codes move through a small state machine:
//!
//! ```text
//!         redeem (before expires_at)
//!  active ───────────────────────────► used     (terminal)
//!    │
//!    │ now >= expires_at
//!    ▼
//! expired                                      (terminal)
//! ```
//!
//! Evaluation here is read-only. Persisting the `active → expired` edge is an
//! explicit step taken by the redemption handler or the expiry sweep.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{
    RedemptionCodeId, StateMachine, Timestamp, UserId, ValidationError,
};

use super::tier::{EntitlementProduct, EntitlementTier};

const MIN_CODE_LEN: usize = 4;
const MAX_CODE_LEN: usize = 64;

/// Canonical form of a code as typed by a user.
///
/// Lookup is case-insensitive: input is trimmed and uppercased before it ever
/// reaches storage, so `abc123` and `ABC123` address the same row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CodeValue(String);

impl CodeValue {
    /// Parses and canonicalizes a code.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - Code is empty after trimming
    /// - Length is outside 4..=64
    /// - Any character is not ASCII alphanumeric, `-` or `_`
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("code"));
        }

        let normalized = trimmed.to_uppercase();

        if normalized.len() < MIN_CODE_LEN || normalized.len() > MAX_CODE_LEN {
            return Err(ValidationError::out_of_range(
                "code_length",
                MIN_CODE_LEN as i64,
                MAX_CODE_LEN as i64,
                normalized.len() as i64,
            ));
        }

        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::invalid_format(
                "code",
                "letters, digits, '-' and '_' only",
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the canonical code string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CodeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CodeValue {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CodeValue> for String {
    fn from(value: CodeValue) -> Self {
        value.0
    }
}

impl FromStr for CodeValue {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Stored lifecycle status of a redemption code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeStatus {
    Active,
    Used,
    Expired,
}

impl CodeStatus {
    /// Returns the storage/wire name for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeStatus::Active => "active",
            CodeStatus::Used => "used",
            CodeStatus::Expired => "expired",
        }
    }
}

impl StateMachine for CodeStatus {
    fn valid_transitions(&self) -> &'static [Self] {
        match self {
            CodeStatus::Active => &[CodeStatus::Used, CodeStatus::Expired],
            CodeStatus::Used | CodeStatus::Expired => &[],
        }
    }
}

impl std::fmt::Display for CodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CodeStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(CodeStatus::Active),
            "used" => Ok(CodeStatus::Used),
            "expired" => Ok(CodeStatus::Expired),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown code status '{}'", other),
            )),
        }
    }
}

/// Why a code cannot be redeemed right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRejection {
    /// Stored status is `used`.
    AlreadyUsed,
    /// Stored status is `expired`.
    Expired,
    /// Stored status is still `active` but the deadline has passed.
    /// The `expired` status has not been persisted yet.
    ExpiredUnmarked,
}

/// An issued redemption code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionCode {
    pub id: RedemptionCodeId,
    pub code: CodeValue,
    pub tier: EntitlementTier,
    pub product: EntitlementProduct,
    pub duration_days: u32,
    pub status: CodeStatus,
    pub used_by: Option<UserId>,
    pub used_at: Option<Timestamp>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl RedemptionCode {
    /// Issues a new active code using the tier's default duration.
    pub fn issue(
        code: CodeValue,
        tier: EntitlementTier,
        product: EntitlementProduct,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> Self {
        Self {
            id: RedemptionCodeId::new(),
            code,
            tier,
            product,
            duration_days: tier.default_duration_days(),
            status: CodeStatus::Active,
            used_by: None,
            used_at: None,
            expires_at,
            created_at: now,
        }
    }

    /// Overrides the number of days this code grants.
    pub fn with_duration_days(mut self, duration_days: u32) -> Self {
        self.duration_days = duration_days;
        self
    }

    /// Status the code effectively has at `now`, without writing anything.
    pub fn effective_status(&self, now: Timestamp) -> CodeStatus {
        match self.status {
            CodeStatus::Active if !self.expires_at.is_after(&now) => CodeStatus::Expired,
            status => status,
        }
    }

    /// Checks whether the code can be redeemed at `now`.
    ///
    /// Priority: used, then stored-expired, then deadline passed.
    pub fn evaluate(&self, now: Timestamp) -> Result<(), CodeRejection> {
        match self.status {
            CodeStatus::Used => Err(CodeRejection::AlreadyUsed),
            CodeStatus::Expired => Err(CodeRejection::Expired),
            CodeStatus::Active if !self.expires_at.is_after(&now) => {
                Err(CodeRejection::ExpiredUnmarked)
            }
            CodeStatus::Active => Ok(()),
        }
    }

    /// Consumes the code on behalf of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the code is not `active`.
    pub fn mark_used(&mut self, user_id: UserId, at: Timestamp) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(CodeStatus::Used)?;
        self.used_by = Some(user_id);
        self.used_at = Some(at);
        Ok(())
    }

    /// Persists the deadline passing.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the code is not `active`.
    pub fn mark_expired(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(CodeStatus::Expired)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> Timestamp {
        Timestamp::from_unix_millis(1_790_000_000_000).unwrap()
    }

    fn monthly(expires_in_days: i64) -> RedemptionCode {
        RedemptionCode::issue(
            CodeValue::parse("ABC123").unwrap(),
            EntitlementTier::Monthly,
            EntitlementProduct::Vip,
            now().offset_by(Duration::days(expires_in_days)),
            now().offset_by(Duration::days(-1)),
        )
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // CodeValue
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn code_is_canonicalized_to_uppercase() {
        let lower = CodeValue::parse("abc123").unwrap();
        let upper = CodeValue::parse("ABC123").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.as_str(), "ABC123");
    }

    #[test]
    fn code_is_trimmed() {
        assert_eq!(CodeValue::parse("  vip-2026 \n").unwrap().as_str(), "VIP-2026");
    }

    #[test]
    fn empty_code_is_rejected() {
        match CodeValue::parse("   ").unwrap_err() {
            ValidationError::EmptyField { field } => assert_eq!(field, "code"),
            other => panic!("Expected EmptyField, got {:?}", other),
        }
    }

    #[test]
    fn short_code_is_rejected() {
        assert!(matches!(
            CodeValue::parse("AB1").unwrap_err(),
            ValidationError::OutOfRange { actual: 3, .. }
        ));
    }

    #[test]
    fn code_with_symbols_is_rejected() {
        assert!(matches!(
            CodeValue::parse("AB C1").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
    }

    #[test]
    fn code_value_deserializes_through_parse() {
        let code: CodeValue = serde_json::from_str("\"vip777\"").unwrap();
        assert_eq!(code.as_str(), "VIP777");
        assert!(serde_json::from_str::<CodeValue>("\"x\"").is_err());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Status machine
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn used_and_expired_are_terminal() {
        assert!(CodeStatus::Used.is_terminal());
        assert!(CodeStatus::Expired.is_terminal());
        assert!(!CodeStatus::Active.is_terminal());
    }

    #[test]
    fn used_cannot_become_expired() {
        assert!(CodeStatus::Used.transition_to(CodeStatus::Expired).is_err());
    }

    #[test]
    fn status_parses_from_storage_names() {
        assert_eq!("used".parse::<CodeStatus>().unwrap(), CodeStatus::Used);
        assert!("revoked".parse::<CodeStatus>().is_err());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Evaluation
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn fresh_code_is_redeemable() {
        let code = monthly(365);
        assert_eq!(code.evaluate(now()), Ok(()));
        assert_eq!(code.duration_days, 30);
    }

    #[test]
    fn used_code_reports_already_used_even_past_deadline() {
        let mut code = monthly(-3);
        code.status = CodeStatus::Used;
        assert_eq!(code.evaluate(now()), Err(CodeRejection::AlreadyUsed));
    }

    #[test]
    fn stored_expired_code_reports_expired() {
        let mut code = monthly(30);
        code.status = CodeStatus::Expired;
        assert_eq!(code.evaluate(now()), Err(CodeRejection::Expired));
    }

    #[test]
    fn deadline_equal_to_now_is_expired() {
        let mut code = monthly(0);
        code.expires_at = now();
        assert_eq!(code.evaluate(now()), Err(CodeRejection::ExpiredUnmarked));
        assert_eq!(code.effective_status(now()), CodeStatus::Expired);
    }

    #[test]
    fn evaluation_does_not_mutate() {
        let code = monthly(-1);
        let before = code.clone();
        let first = code.evaluate(now());
        let second = code.evaluate(now());
        assert_eq!(first, second);
        assert_eq!(code, before);
    }

    #[test]
    fn mark_used_sets_redeemer_once() {
        let mut code = monthly(10);
        code.mark_used(user(), now()).unwrap();

        assert_eq!(code.status, CodeStatus::Used);
        assert_eq!(code.used_by, Some(user()));
        assert_eq!(code.used_at, Some(now()));
        assert!(code.mark_used(UserId::new("user-2").unwrap(), now()).is_err());
        assert_eq!(code.used_by, Some(user()));
    }

    #[test]
    fn mark_expired_only_from_active() {
        let mut code = monthly(-1);
        code.mark_expired().unwrap();
        assert_eq!(code.status, CodeStatus::Expired);
        assert!(code.mark_expired().is_err());
    }

    #[test]
    fn explicit_duration_overrides_tier_default() {
        let code = monthly(10).with_duration_days(45);
        assert_eq!(code.duration_days, 45);
        assert_eq!(code.tier, EntitlementTier::Monthly);
    }
}
