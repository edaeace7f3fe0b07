//! Platform configuration source port.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::platform::PlatformConfig;

/// Where the current platform configuration is loaded from.
///
/// Callers go through `PlatformConfigCache` rather than hitting the source
/// on every request.
#[async_trait]
pub trait PlatformConfigSource: Send + Sync {
    /// Loads the current configuration.
    async fn load(&self) -> Result<PlatformConfig, DomainError>;
}
