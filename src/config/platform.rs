//! Platform settings for the in-memory backend, plus cache tuning

use serde::Deserialize;
use std::time::Duration;

use crate::domain::platform::PlatformConfig;

/// Platform configuration
///
/// With the memory backend these values seed the static config source. The
/// database-backed sources ignore them and only `cache_ttl_secs` applies.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSettings {
    /// How long a loaded platform config is served from cache
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_redemption_enabled")]
    pub redemption_enabled: bool,

    pub support_contact: Option<String>,

    pub announcement: Option<String>,
}

impl PlatformSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn to_platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            redemption_enabled: self.redemption_enabled,
            support_contact: self.support_contact.clone(),
            announcement: self.announcement.clone(),
            ..PlatformConfig::default()
        }
    }
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            redemption_enabled: default_redemption_enabled(),
            support_contact: None,
            announcement: None,
        }
    }
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_redemption_enabled() -> bool {
    true
}
