//! VIP Entitlements server binary.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vip_entitlements::adapters::http::{admin_app, app, EntitlementAppState};
use vip_entitlements::adapters::memory::{InMemoryEntitlementStore, StaticPlatformConfigSource};
use vip_entitlements::adapters::postgres::{
    run_migrations, PostgresEntitlementReader, PostgresPlatformConfigSource,
    PostgresRedemptionCodeRepository, PostgresRedemptionRepository,
};
use vip_entitlements::adapters::supabase::{SupabaseClient, SupabaseEntitlementStore};
use vip_entitlements::application::{ExpireCodesCommand, ExpireCodesHandler, PlatformConfigCache};
use vip_entitlements::config::{AppConfig, ServerConfig, StorageBackend};
use vip_entitlements::domain::foundation::Timestamp;
use vip_entitlements::ports::{
    EntitlementReader, PlatformConfigSource, RedemptionCodeRepository, RedemptionRepository,
};

/// Port implementations for the selected backend.
struct Storage {
    codes: Arc<dyn RedemptionCodeRepository>,
    reader: Arc<dyn EntitlementReader>,
    redemptions: Arc<dyn RedemptionRepository>,
    platform: Arc<dyn PlatformConfigSource>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    config.validate().context("validating configuration")?;

    init_tracing(&config.server);

    let storage = connect_storage(&config).await?;
    let platform_config = Arc::new(PlatformConfigCache::new(
        storage.platform.clone(),
        config.platform.cache_ttl(),
    ));

    if let Some(interval) = config.redemption.sweep_interval() {
        spawn_expiry_sweep(ExpireCodesHandler::new(storage.codes.clone()), interval);
    }

    let state = EntitlementAppState {
        code_repository: storage.codes,
        entitlement_reader: storage.reader,
        redemption_repository: storage.redemptions,
        platform_config,
        settings: config.redemption.settings(),
        display_offset: config.redemption.display_offset(),
    };

    if let Some(admin_addr) = config.server.admin_socket_addr() {
        let listener = tokio::net::TcpListener::bind(admin_addr).await?;
        info!(%admin_addr, "Admin listener bound");
        let admin = admin_app(state.clone());
        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, admin).await {
                warn!(error = %err, "Admin listener stopped");
            }
        });
    }

    let router = app(state, cors_layer(&config.server)?)
        .layer(TimeoutLayer::new(config.server.request_timeout()));

    let addr = config.server.socket_addr()?;
    info!(%addr, backend = ?config.storage.backend, "VIP entitlements server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if server.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn connect_storage(config: &AppConfig) -> anyhow::Result<Storage> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on restart");
            let store = Arc::new(InMemoryEntitlementStore::new());
            Ok(Storage {
                codes: store.clone(),
                reader: store.clone(),
                redemptions: store,
                platform: Arc::new(StaticPlatformConfigSource::new(
                    config.platform.to_platform_config(),
                )),
            })
        }
        StorageBackend::Postgres => {
            let db = config
                .database
                .as_ref()
                .context("database section missing")?;
            let pool = db
                .pool_options()
                .connect(&db.url)
                .await
                .context("connecting to PostgreSQL")?;
            if db.run_migrations {
                run_migrations(&pool).await?;
                info!("Migrations applied");
            }
            Ok(Storage {
                codes: Arc::new(PostgresRedemptionCodeRepository::new(pool.clone())),
                reader: Arc::new(PostgresEntitlementReader::new(pool.clone())),
                redemptions: Arc::new(PostgresRedemptionRepository::new(pool.clone())),
                platform: Arc::new(PostgresPlatformConfigSource::new(pool)),
            })
        }
        StorageBackend::Supabase => {
            let supabase = config
                .supabase
                .as_ref()
                .context("supabase section missing")?;
            let client = SupabaseClient::new(
                supabase.url.clone(),
                supabase.service_key.clone(),
                supabase.timeout(),
            )?;
            let store = Arc::new(SupabaseEntitlementStore::new(client));
            Ok(Storage {
                codes: store.clone(),
                reader: store.clone(),
                redemptions: store.clone(),
                platform: store,
            })
        }
    }
}

fn spawn_expiry_sweep(handler: ExpireCodesHandler, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let cmd = ExpireCodesCommand {
                now: Timestamp::now(),
            };
            if let Err(err) = handler.handle(cmd).await {
                warn!(error = %err, "Expired code sweep failed");
            }
        }
    });
}

fn cors_layer(server: &ServerConfig) -> anyhow::Result<CorsLayer> {
    let origins = server.allowed_origins()?;
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
