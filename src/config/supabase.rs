//! Supabase configuration (used when `storage.backend = "supabase"`)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Supabase PostgREST configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`
    pub url: String,

    /// Service role key, sent as `apikey` and bearer token
    pub service_key: SecretString,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl SupabaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate Supabase configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("SUPABASE__URL"));
        }
        if self.service_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("SUPABASE__SERVICE_KEY"));
        }
        let is_https = self.url.starts_with("https://");
        if !is_https && !self.url.starts_with("http://") {
            return Err(ValidationError::InvalidSupabaseUrl);
        }
        if *environment == Environment::Production && !is_https {
            return Err(ValidationError::SupabaseUrlMustBeHttps);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, key: &str) -> SupabaseConfig {
        SupabaseConfig {
            url: url.to_string(),
            service_key: SecretString::new(key.to_string()),
            timeout_secs: default_timeout(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = config("https://project.supabase.co", "service-role-key");
        assert!(config.validate(&Environment::Production).is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_missing_values() {
        assert_eq!(
            config("", "key").validate(&Environment::Development),
            Err(ValidationError::MissingRequired("SUPABASE__URL"))
        );
        assert_eq!(
            config("https://project.supabase.co", "").validate(&Environment::Development),
            Err(ValidationError::MissingRequired("SUPABASE__SERVICE_KEY"))
        );
    }

    #[test]
    fn test_plain_http_only_outside_production() {
        let local = config("http://localhost:54321", "key");
        assert!(local.validate(&Environment::Development).is_ok());
        assert_eq!(
            local.validate(&Environment::Production),
            Err(ValidationError::SupabaseUrlMustBeHttps)
        );
        assert_eq!(
            config("ftp://project", "key").validate(&Environment::Development),
            Err(ValidationError::InvalidSupabaseUrl)
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", config("https://project.supabase.co", "super-secret"));
        assert!(!debug.contains("super-secret"));
    }
}
