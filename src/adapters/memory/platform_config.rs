//! Static platform configuration source.
//!
//! Serves a fixed `PlatformConfig`, typically built from the `platform`
//! section of the application config. Counts loads so cache behaviour can be
//! asserted in tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::platform::PlatformConfig;
use crate::ports::PlatformConfigSource;

/// Platform config source backed by a value held in memory.
pub struct StaticPlatformConfigSource {
    config: RwLock<PlatformConfig>,
    loads: AtomicUsize,
}

impl StaticPlatformConfigSource {
    pub fn new(config: PlatformConfig) -> Self {
        Self {
            config: RwLock::new(config),
            loads: AtomicUsize::new(0),
        }
    }

    /// Replaces the served configuration. Cached copies are unaffected
    /// until they are invalidated or expire.
    pub fn replace(&self, config: PlatformConfig) -> Result<(), DomainError> {
        let mut slot = self
            .config
            .write()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "platform config lock poisoned"))?;
        *slot = config;
        Ok(())
    }

    /// Number of times `load` has been called.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformConfigSource for StaticPlatformConfigSource {
    async fn load(&self) -> Result<PlatformConfig, DomainError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.config
            .read()
            .map(|config| config.clone())
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "platform config lock poisoned"))
    }
}
