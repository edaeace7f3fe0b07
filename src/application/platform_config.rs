//! Platform configuration cache.
//!
//! Loads the configuration lazily on first use and keeps it for a fixed TTL.
//! `invalidate()` drops the cached copy so the next `get()` reloads. Each
//! cache is an ordinary value owned by whoever builds the handlers, so every
//! test gets a fresh one.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::foundation::DomainError;
use crate::domain::platform::PlatformConfig;
use crate::ports::PlatformConfigSource;

struct Cached {
    config: Arc<PlatformConfig>,
    loaded_at: Instant,
}

/// TTL-bounded cache in front of a [`PlatformConfigSource`].
pub struct PlatformConfigCache {
    source: Arc<dyn PlatformConfigSource>,
    ttl: Duration,
    slot: RwLock<Option<Cached>>,
}

impl PlatformConfigCache {
    pub fn new(source: Arc<dyn PlatformConfigSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Returns the cached configuration, loading it if absent or stale.
    ///
    /// A failed load leaves any previous (stale) copy in place and returns the error.
    pub async fn get(&self) -> Result<Arc<PlatformConfig>, DomainError> {
        if let Some(config) = self.fresh(&*self.slot.read().await) {
            return Ok(config);
        }

        let mut slot = self.slot.write().await;
        // Another task may have reloaded while we waited for the write lock.
        if let Some(config) = self.fresh(&slot) {
            return Ok(config);
        }

        let config = Arc::new(self.source.load().await?);
        debug!(ttl_secs = self.ttl.as_secs(), "Loaded platform config");
        *slot = Some(Cached {
            config: config.clone(),
            loaded_at: Instant::now(),
        });
        Ok(config)
    }

    /// Drops the cached copy.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
        debug!("Platform config cache invalidated");
    }

    fn fresh(&self, slot: &Option<Cached>) -> Option<Arc<PlatformConfig>> {
        slot.as_ref()
            .filter(|cached| cached.loaded_at.elapsed() < self.ttl)
            .map(|cached| cached.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::StaticPlatformConfigSource;
    use crate::domain::foundation::ErrorCode;
    use async_trait::async_trait;

    fn source() -> Arc<StaticPlatformConfigSource> {
        Arc::new(StaticPlatformConfigSource::new(PlatformConfig::default()))
    }

    struct FailingSource;

    #[async_trait]
    impl PlatformConfigSource for FailingSource {
        async fn load(&self) -> Result<PlatformConfig, DomainError> {
            Err(DomainError::new(ErrorCode::ExternalServiceError, "backend unavailable"))
        }
    }

    #[tokio::test]
    async fn loads_once_within_ttl() {
        let source = source();
        let cache = PlatformConfigCache::new(source.clone(), Duration::from_secs(300));

        cache.get().await.unwrap();
        cache.get().await.unwrap();
        cache.get().await.unwrap();

        assert_eq!(source.load_count(), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let source = source();
        let cache = PlatformConfigCache::new(source.clone(), Duration::from_secs(300));

        assert!(cache.get().await.unwrap().redemption_enabled);
        source
            .replace(PlatformConfig {
                redemption_enabled: false,
                ..PlatformConfig::default()
            })
            .unwrap();
        assert!(cache.get().await.unwrap().redemption_enabled);

        cache.invalidate().await;

        assert!(!cache.get().await.unwrap().redemption_enabled);
        assert_eq!(source.load_count(), 2);
    }

    #[tokio::test]
    async fn zero_ttl_reloads_every_time() {
        let source = source();
        let cache = PlatformConfigCache::new(source.clone(), Duration::ZERO);

        cache.get().await.unwrap();
        cache.get().await.unwrap();

        assert_eq!(source.load_count(), 2);
    }

    #[tokio::test]
    async fn load_failure_is_returned() {
        let cache = PlatformConfigCache::new(Arc::new(FailingSource), Duration::from_secs(60));
        let err = cache.get().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
    }
}
