//! Redemption flow configuration

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::RedemptionSettings;

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Redemption configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedemptionConfig {
    /// Upper bound on one redemption attempt before reporting an unknown outcome
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Commit retries when the entitlement changed underneath us
    #[serde(default = "default_max_commit_attempts")]
    pub max_commit_attempts: u32,

    /// Offset used for the displayed expiry date
    #[serde(default)]
    pub display_utc_offset_minutes: i32,

    /// Interval of the expired-code sweep; 0 disables it
    #[serde(default)]
    pub sweep_interval_secs: u64,
}

impl RedemptionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settings(&self) -> RedemptionSettings {
        RedemptionSettings {
            timeout: self.timeout(),
            max_commit_attempts: self.max_commit_attempts,
        }
    }

    /// Display offset. Falls back to UTC for an out-of-range value.
    pub fn display_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.display_utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Sweep interval, if the sweep is enabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }

    /// Validate redemption configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidRedemptionTimeout);
        }
        if self.max_commit_attempts == 0 || self.max_commit_attempts > 10 {
            return Err(ValidationError::InvalidCommitAttempts);
        }
        if self.display_utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ValidationError::InvalidUtcOffset);
        }
        Ok(())
    }
}

impl Default for RedemptionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_commit_attempts: default_max_commit_attempts(),
            display_utc_offset_minutes: 0,
            sweep_interval_secs: 0,
        }
    }
}

fn default_timeout() -> u64 {
    20
}

fn default_max_commit_attempts() -> u32 {
    3
}
