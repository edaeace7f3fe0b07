//! ExpireCodesHandler - Command handler that persists expiry for stale codes.

use std::sync::Arc;

use tracing::info;

use crate::domain::entitlement::RedemptionError;
use crate::domain::foundation::Timestamp;
use crate::ports::RedemptionCodeRepository;

/// Command to finalize every active code whose deadline has passed.
#[derive(Debug, Clone, Copy)]
pub struct ExpireCodesCommand {
    pub now: Timestamp,
}

/// Number of codes moved from `active` to `expired`.
pub type ExpireCodesResult = u64;

/// Handler for the periodic expiry sweep.
pub struct ExpireCodesHandler {
    codes: Arc<dyn RedemptionCodeRepository>,
}

impl ExpireCodesHandler {
    pub fn new(codes: Arc<dyn RedemptionCodeRepository>) -> Self {
        Self { codes }
    }

    pub async fn handle(&self, cmd: ExpireCodesCommand) -> Result<ExpireCodesResult, RedemptionError> {
        let expired = self.codes.expire_due(cmd.now).await?;
        if expired > 0 {
            info!(expired, "Finalized expired redemption codes");
        }
        Ok(expired)
    }
}
