//! HTTP listener settings

use http::HeaderValue;
use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use super::error::ValidationError;

const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Deployment stage. Production switches logs to JSON and requires HTTPS upstreams.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Listener, logging and request-level limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub log_level: String,
    /// Hard cap on a whole HTTP request. Must outlast the redemption timeout.
    pub request_timeout_secs: u64,
    /// Comma-separated allowed origins. Unset or empty allows any origin.
    pub cors_origins: Option<String>,
    /// Loopback port for operator endpoints; unset disables them.
    pub admin_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: Environment::Development,
            log_level: "info,vip_entitlements=debug,sqlx=warn,tower_http=info".to_string(),
            request_timeout_secs: 30,
            cors_origins: None,
            admin_port: None,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|_| ValidationError::InvalidBindAddress(raw))
    }

    /// Operator listener address, always on 127.0.0.1.
    pub fn admin_socket_addr(&self) -> Option<SocketAddr> {
        self.admin_port
            .map(|port| SocketAddr::from((Ipv4Addr::LOCALHOST, port)))
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parsed CORS origins. An empty list means "allow any".
    pub fn allowed_origins(&self) -> Result<Vec<HeaderValue>, ValidationError> {
        let Some(raw) = self.cors_origins.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| ValidationError::InvalidCorsOrigin(origin.to_string()))
            })
            .collect()
    }

    /// Rejects a request timeout that would cut a redemption off before it
    /// can report its own timeout.
    pub fn ensure_outlasts(&self, redemption_timeout: Duration) -> Result<(), ValidationError> {
        if redemption_timeout >= self.request_timeout() {
            return Err(ValidationError::RequestTimeoutTooShort {
                request_secs: self.request_timeout_secs,
                redemption_secs: redemption_timeout.as_secs(),
            });
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ValidationError::InvalidTimeout);
        }
        if matches!(self.admin_port, Some(port) if port == 0 || port == self.port) {
            return Err(ValidationError::InvalidPort);
        }
        self.socket_addr()?;
        self.allowed_origins()?;
        Ok(())
    }
}
