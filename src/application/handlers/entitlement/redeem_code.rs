//! RedeemCodeHandler - Command handler for exchanging a redemption code for entitlement time.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::application::PlatformConfigCache;
use crate::domain::entitlement::{
    extend, CodeRejection, CodeStatus, CodeValue, EntitlementProduct, RedemptionCode,
    RedemptionError, RedemptionRecord, UserEntitlement,
};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{
    CommitOutcome, EntitlementReader, RedemptionCodeRepository, RedemptionCommit,
    RedemptionRepository,
};

/// Command to redeem a code for a user.
#[derive(Debug, Clone)]
pub struct RedeemCodeCommand {
    pub user_id: UserId,
    /// Code as typed; canonicalized by the handler.
    pub code: String,
    /// Product the client is redeeming for. `None` accepts whatever the code grants.
    pub product: Option<EntitlementProduct>,
    pub requested_at: Timestamp,
}

/// Result of a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemCodeResult {
    pub record: RedemptionRecord,
    pub entitlement: UserEntitlement,
}

/// Bounds applied to every redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionSettings {
    /// Upper bound on the whole lookup-and-commit chain.
    pub timeout: Duration,
    /// Commit attempts when a concurrent redemption moves the user's expiry.
    pub max_commit_attempts: u32,
}

impl Default for RedemptionSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            max_commit_attempts: 3,
        }
    }
}

/// Handler for redeeming codes.
///
/// Validation and the per-user ledger check run first as cheap early
/// rejections. The commit repeats every check atomically on the backend, so
/// racing requests cannot both win.
pub struct RedeemCodeHandler {
    codes: Arc<dyn RedemptionCodeRepository>,
    reader: Arc<dyn EntitlementReader>,
    repository: Arc<dyn RedemptionRepository>,
    platform: Arc<PlatformConfigCache>,
    settings: RedemptionSettings,
}

impl RedeemCodeHandler {
    pub fn new(
        codes: Arc<dyn RedemptionCodeRepository>,
        reader: Arc<dyn EntitlementReader>,
        repository: Arc<dyn RedemptionRepository>,
        platform: Arc<PlatformConfigCache>,
        settings: RedemptionSettings,
    ) -> Self {
        Self {
            codes,
            reader,
            repository,
            platform,
            settings,
        }
    }

    pub async fn handle(&self, cmd: RedeemCodeCommand) -> Result<RedeemCodeResult, RedemptionError> {
        let user_id = cmd.user_id.clone();
        let raw_code = cmd.code.clone();

        match tokio::time::timeout(self.settings.timeout, self.redeem(cmd)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    user_id = %user_id,
                    code = %raw_code,
                    timeout_secs = self.settings.timeout.as_secs(),
                    "Redemption timed out; outcome unknown"
                );
                Err(RedemptionError::OutcomeUnknown {
                    timeout_secs: self.settings.timeout.as_secs(),
                })
            }
        }
    }

    async fn redeem(&self, cmd: RedeemCodeCommand) -> Result<RedeemCodeResult, RedemptionError> {
        let now = cmd.requested_at;

        // 1. Platform switch
        self.ensure_enabled().await?;

        // 2. Canonicalize and look up
        let code = CodeValue::parse(&cmd.code)?;
        let stored = self
            .codes
            .find_by_code(&code)
            .await?
            .ok_or_else(|| RedemptionError::not_found(code.as_str()))?;

        // 3. Redeemable at all?
        if let Err(rejection) = stored.evaluate(now) {
            return Err(self.reject(&stored, rejection, &cmd.user_id, now).await);
        }

        if let Some(requested) = cmd.product {
            if requested != stored.product {
                return Err(RedemptionError::ProductMismatch {
                    code: code.to_string(),
                    requested,
                    actual: stored.product,
                });
            }
        }

        // 4. Already redeemed by this user?
        if self.reader.find_record(&cmd.user_id, &code).await?.is_some() {
            return Err(RedemptionError::already_redeemed(code.as_str()));
        }

        // 5-6. Compute and commit; recompute if a concurrent grant moved the expiry
        for attempt in 1..=self.settings.max_commit_attempts {
            let current = self
                .reader
                .find_entitlement(&cmd.user_id, stored.product)
                .await?
                .and_then(|e| e.expires_at);
            // Inputs come from stored rows, so a failure here is bad data, not bad input.
            let new_expires_at = extend(current, stored.duration_days, now).map_err(|e| {
                RedemptionError::persistence(format!(
                    "Cannot apply code {} to stored entitlement: {}",
                    code, e
                ))
            })?;

            let commit = RedemptionCommit {
                code_id: stored.id,
                record: RedemptionRecord::for_code(
                    cmd.user_id.clone(),
                    &stored,
                    current,
                    new_expires_at,
                    now,
                ),
            };

            match self.repository.commit(&commit).await? {
                CommitOutcome::Committed(record) => {
                    info!(
                        user_id = %record.user_id,
                        code = %record.code,
                        product = %record.product,
                        tier = %record.code_type,
                        new_expires_at = %record.new_expires_at,
                        "Redemption committed"
                    );
                    let entitlement = UserEntitlement {
                        user_id: record.user_id.clone(),
                        product: record.product,
                        expires_at: Some(record.new_expires_at),
                        last_grant_tier: Some(record.code_type),
                        updated_at: Some(record.redeemed_at),
                    };
                    return Ok(RedeemCodeResult { record, entitlement });
                }
                CommitOutcome::AlreadyRedeemed => {
                    return Err(RedemptionError::already_redeemed(code.as_str()));
                }
                CommitOutcome::CodeUnavailable => {
                    return Err(self.explain_unavailable(&code, &cmd.user_id, now).await);
                }
                CommitOutcome::EntitlementChanged => {
                    debug!(
                        user_id = %cmd.user_id,
                        code = %code,
                        attempt,
                        "Entitlement changed concurrently; recomputing"
                    );
                }
            }
        }

        warn!(
            user_id = %cmd.user_id,
            code = %code,
            attempts = self.settings.max_commit_attempts,
            "Gave up committing redemption after repeated concurrent updates"
        );
        Err(RedemptionError::persistence(format!(
            "entitlement kept changing; gave up after {} attempts",
            self.settings.max_commit_attempts
        )))
    }

    async fn ensure_enabled(&self) -> Result<(), RedemptionError> {
        match self.platform.get().await {
            Ok(config) if !config.redemption_enabled => Err(RedemptionError::RedemptionDisabled),
            Ok(_) => Ok(()),
            Err(err) => {
                // The switch is advisory; an unreachable config source must not block redemptions.
                warn!(error = %err, "Platform config unavailable; assuming redemption enabled");
                Ok(())
            }
        }
    }

    /// Maps a rejection to the caller-facing error, finalizing expiry when needed.
    async fn reject(
        &self,
        stored: &RedemptionCode,
        rejection: CodeRejection,
        user_id: &UserId,
        now: Timestamp,
    ) -> RedemptionError {
        match rejection {
            CodeRejection::AlreadyUsed => {
                if self.redeemed_by(stored, user_id).await {
                    RedemptionError::already_redeemed(stored.code.as_str())
                } else {
                    RedemptionError::already_used(stored.code.as_str())
                }
            }
            CodeRejection::Expired => RedemptionError::expired(stored.code.as_str()),
            CodeRejection::ExpiredUnmarked => {
                match self.codes.finalize_expiry(&stored.id, now).await {
                    Ok(changed) => {
                        debug!(code = %stored.code, changed, "Finalized code expiry");
                    }
                    Err(err) => {
                        // The periodic sweep catches up with codes left active here.
                        warn!(code = %stored.code, error = %err, "Failed to finalize code expiry");
                    }
                }
                RedemptionError::expired(stored.code.as_str())
            }
        }
    }

    async fn redeemed_by(&self, stored: &RedemptionCode, user_id: &UserId) -> bool {
        if stored.used_by.as_ref() == Some(user_id) {
            return true;
        }
        matches!(self.reader.find_record(user_id, &stored.code).await, Ok(Some(_)))
    }

    /// The code was active when read but the commit found it consumed or expired.
    async fn explain_unavailable(
        &self,
        code: &CodeValue,
        user_id: &UserId,
        now: Timestamp,
    ) -> RedemptionError {
        match self.codes.find_by_code(code).await {
            Ok(Some(current)) => match current.effective_status(now) {
                CodeStatus::Used if self.redeemed_by(&current, user_id).await => {
                    RedemptionError::already_redeemed(code.as_str())
                }
                CodeStatus::Used => RedemptionError::already_used(code.as_str()),
                CodeStatus::Expired => RedemptionError::expired(code.as_str()),
                CodeStatus::Active => RedemptionError::persistence(format!(
                    "code {} reported unavailable but is still active",
                    code
                )),
            },
            Ok(None) => RedemptionError::not_found(code.as_str()),
            Err(err) => err.into(),
        }
    }
}
