//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),

    #[error("Request timeout ({request_secs}s) must exceed the redemption timeout ({redemption_secs}s)")]
    RequestTimeoutTooShort { request_secs: u64, redemption_secs: u64 },

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Supabase URL must use HTTPS in production")]
    SupabaseUrlMustBeHttps,

    #[error("Invalid Supabase URL format")]
    InvalidSupabaseUrl,

    #[error("Redemption timeout must be between 1 and 120 seconds")]
    InvalidRedemptionTimeout,

    #[error("max_commit_attempts must be between 1 and 10")]
    InvalidCommitAttempts,

    #[error("UTC offset must be within ±14 hours")]
    InvalidUtcOffset,
}
