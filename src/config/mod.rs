//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `VIP_ENTITLEMENTS` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use vip_entitlements::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod platform;
mod redemption;
mod server;
mod storage;
mod supabase;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use platform::PlatformSettings;
pub use redemption::RedemptionConfig;
pub use server::{Environment, ServerConfig};
pub use storage::{StorageBackend, StorageConfig};
pub use supabase::SupabaseConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Only the section for the selected storage backend is required.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// PostgreSQL connection (postgres backend)
    pub database: Option<DatabaseConfig>,

    /// PostgREST endpoint (supabase backend)
    pub supabase: Option<SupabaseConfig>,

    #[serde(default)]
    pub redemption: RedemptionConfig,

    #[serde(default)]
    pub platform: PlatformSettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `VIP_ENTITLEMENTS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `VIP_ENTITLEMENTS__STORAGE__BACKEND=postgres` -> `storage.backend = postgres`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("VIP_ENTITLEMENTS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any value is invalid, the HTTP request
    /// timeout would fire before the redemption timeout, or the section for
    /// the selected backend is missing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.redemption.validate()?;
        self.server.ensure_outlasts(self.redemption.timeout())?;
        match self.storage.backend {
            StorageBackend::Memory => {}
            StorageBackend::Postgres => self
                .database
                .as_ref()
                .ok_or(ValidationError::MissingRequired("DATABASE__URL"))?
                .validate()?,
            StorageBackend::Supabase => self
                .supabase
                .as_ref()
                .ok_or(ValidationError::MissingRequired("SUPABASE__URL"))?
                .validate(&self.server.environment)?,
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "VIP_ENTITLEMENTS__STORAGE__BACKEND",
        "VIP_ENTITLEMENTS__DATABASE__URL",
        "VIP_ENTITLEMENTS__SUPABASE__URL",
        "VIP_ENTITLEMENTS__SUPABASE__SERVICE_KEY",
        "VIP_ENTITLEMENTS__SERVER__PORT",
        "VIP_ENTITLEMENTS__SERVER__ENVIRONMENT",
        "VIP_ENTITLEMENTS__SERVER__REQUEST_TIMEOUT_SECS",
        "VIP_ENTITLEMENTS__REDEMPTION__TIMEOUT_SECS",
        "VIP_ENTITLEMENTS__REDEMPTION__DISPLAY_UTC_OFFSET_MINUTES",
        "VIP_ENTITLEMENTS__PLATFORM__REDEMPTION_ENABLED",
    ];

    fn load_with(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        for key in VARS {
            env::remove_var(key);
        }
        result
    }

    #[test]
    fn test_memory_backend_needs_nothing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[]).unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.redemption.timeout_secs, 20);
        assert_eq!(config.platform.cache_ttl_secs, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_backend() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("VIP_ENTITLEMENTS__STORAGE__BACKEND", "postgres"),
            ("VIP_ENTITLEMENTS__DATABASE__URL", "postgresql://test@localhost/test"),
        ])
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(
            config.database.as_ref().map(|db| db.url.as_str()),
            Some("postgresql://test@localhost/test")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_selected_backend_section_is_required() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[("VIP_ENTITLEMENTS__STORAGE__BACKEND", "supabase")]).unwrap();

        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("SUPABASE__URL"))
        );
    }

    #[test]
    fn test_supabase_backend_in_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("VIP_ENTITLEMENTS__STORAGE__BACKEND", "supabase"),
            ("VIP_ENTITLEMENTS__SUPABASE__URL", "https://project.supabase.co"),
            ("VIP_ENTITLEMENTS__SUPABASE__SERVICE_KEY", "service-role"),
            ("VIP_ENTITLEMENTS__SERVER__ENVIRONMENT", "production"),
        ])
        .unwrap();

        assert!(config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("VIP_ENTITLEMENTS__SERVER__PORT", "3000"),
            ("VIP_ENTITLEMENTS__REDEMPTION__DISPLAY_UTC_OFFSET_MINUTES", "480"),
            ("VIP_ENTITLEMENTS__PLATFORM__REDEMPTION_ENABLED", "false"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.redemption.display_offset().local_minus_utc(), 8 * 3600);
        assert!(!config.platform.to_platform_config().redemption_enabled);
    }

    #[test]
    fn test_request_timeout_must_exceed_redemption_timeout() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("VIP_ENTITLEMENTS__SERVER__REQUEST_TIMEOUT_SECS", "10"),
            ("VIP_ENTITLEMENTS__REDEMPTION__TIMEOUT_SECS", "60"),
        ])
        .unwrap();

        assert!(config.server.validate().is_ok());
        assert!(config.redemption.validate().is_ok());
        assert_eq!(
            config.validate(),
            Err(ValidationError::RequestTimeoutTooShort {
                request_secs: 10,
                redemption_secs: 60,
            })
        );
    }
}
