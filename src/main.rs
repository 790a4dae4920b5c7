use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tunematch_api::{
    api::{create_router, AppState},
    config::{CatalogBackend, Config, SessionBackend},
    db::{
        self, CacheWriterHandle, CandidateStore, MemoryCandidateStore, MemorySessionStore,
        PgCandidateStore, RedisSessionStore, SessionStore,
    },
    services::providers::{HistoryProvider, SpotifyHistoryProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunematch_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let provider_timeout = Duration::from_secs(config.provider_timeout_secs);

    let store = create_candidate_store(&config).await?;
    let song_count = store.count().await?;
    tracing::info!(store = store.name(), songs = song_count, "Song catalog ready");

    let (sessions, cache_handle) = create_session_store(&config)?;

    let history_provider: Arc<dyn HistoryProvider> = Arc::new(SpotifyHistoryProvider::new(
        config.history_api_url.clone(),
        provider_timeout,
    )?);

    let state = AppState::new(
        history_provider,
        store,
        sessions,
        provider_timeout,
        Duration::from_secs(config.genre_timeout_secs),
    );
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

async fn create_candidate_store(config: &Config) -> anyhow::Result<Arc<dyn CandidateStore>> {
    match config.catalog_backend {
        CatalogBackend::Postgres => {
            let pool = db::create_pool(&config.database_url).await?;
            db::run_migrations(&pool).await?;
            let store = PgCandidateStore::new(pool);

            if config.seed_catalog {
                let songs = db::read_catalog_file(config.catalog_source()).await?;
                store.seed(&songs).await?;
            }

            Ok(Arc::new(store))
        }
        CatalogBackend::File => {
            let path = config
                .catalog_file
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("CATALOG_FILE is not set"))?;
            Ok(Arc::new(MemoryCandidateStore::from_file(path).await?))
        }
    }
}

fn create_session_store(
    config: &Config,
) -> anyhow::Result<(Arc<dyn SessionStore>, Option<CacheWriterHandle>)> {
    match config.session_backend {
        SessionBackend::Redis => {
            let client = db::create_redis_client(&config.redis_url)?;
            let (cache, handle) = db::Cache::new(client);
            let store = RedisSessionStore::new(cache, config.session_ttl_secs);
            Ok((Arc::new(store), Some(handle)))
        }
        SessionBackend::Memory => {
            let store = MemorySessionStore::new(Duration::from_secs(config.session_ttl_secs));
            Ok((Arc::new(store), None))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
