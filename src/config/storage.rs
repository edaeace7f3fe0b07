//! Storage backend selection

use serde::Deserialize;

/// Which adapter set backs the entitlement ports.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local store, lost on restart.
    #[default]
    Memory,
    /// PostgreSQL through sqlx.
    Postgres,
    /// Supabase PostgREST over HTTPS.
    Supabase,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}
