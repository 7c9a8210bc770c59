//! HTTP server initialization and runtime setup.
//!
//! Handles backend connections, cache setup, worker spawning, and Axum server lifecycle.

use crate::application::link_store::CachedLinkStore;
use crate::application::services::{LinkService, StatsService};
use crate::config::{CacheBackend, Config, StorageBackend};
use crate::domain::click_worker::{ClickDispatcher, run_click_worker};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::persistence::{
    MemoryClickRepository, MemoryLinkRepository, PgClickRepository, PgLinkRepository,
};
use crate::routes::app_router;
use crate::state::{AppState, DynLinkService, DynStatsService};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Storage and cache handles selected by configuration.
pub struct Backends {
    pub links: Arc<dyn LinkRepository>,
    pub clicks: Arc<dyn ClickRepository>,
    pub cache: Arc<dyn CacheService>,
}

/// Connects the configured storage and cache backends.
///
/// Postgres migrations are applied on connect. An unreachable Redis is not
/// fatal: the service runs uncached and logs a warning.
///
/// # Errors
///
/// Returns an error if the database cannot be reached or migrated.
pub async fn connect_backends(config: &Config) -> Result<Backends> {
    let (links, clicks): (Arc<dyn LinkRepository>, Arc<dyn ClickRepository>) =
        match config.storage_backend {
            StorageBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required for the postgres backend")?;

                let pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                    .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                    .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                    .connect(database_url)
                    .await
                    .context("Failed to connect to database")?;
                tracing::info!("Connected to database");

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to run migrations")?;

                let pool = Arc::new(pool);
                (
                    Arc::new(PgLinkRepository::new(pool.clone())),
                    Arc::new(PgClickRepository::new(pool)),
                )
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; links are lost on restart");
                (
                    Arc::new(MemoryLinkRepository::new()),
                    Arc::new(MemoryClickRepository::new()),
                )
            }
        };

    let cache: Arc<dyn CacheService> = match (&config.cache_backend, &config.redis_url) {
        (CacheBackend::Redis, Some(redis_url)) => match RedisCache::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to connect to Redis, running without cache");
                Arc::new(NullCache::new())
            }
        },
        (CacheBackend::Redis, None) => {
            tracing::warn!("Redis cache selected without REDIS_URL, running without cache");
            Arc::new(NullCache::new())
        }
        (CacheBackend::Memory, _) => {
            tracing::info!("Cache enabled (in-memory)");
            Arc::new(MemoryCache::with_max_entries(config.cache_max_entries))
        }
        (CacheBackend::None, _) => {
            tracing::info!("Cache disabled");
            Arc::new(NullCache::new())
        }
    };

    Ok(Backends {
        links,
        clicks,
        cache,
    })
}

/// Wires the services on top of connected backends.
pub fn build_services(
    config: &Config,
    backends: Backends,
) -> (Arc<DynLinkService>, Arc<DynStatsService>) {
    let settings = config.store_settings();

    let store = Arc::new(CachedLinkStore::new(
        backends.links.clone(),
        backends.cache,
        settings,
    ));
    let link_service = Arc::new(LinkService::with_code_length(
        store,
        config.short_code_length,
    ));
    let stats_service = Arc::new(StatsService::new(
        backends.links,
        backends.clicks,
        settings.store_timeout,
    ));

    (link_service, stats_service)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (Postgres with migrations, or in-memory)
/// - Cache backend (Redis, in-memory, or none)
/// - Background click worker
/// - Axum HTTP server with graceful shutdown
///
/// On SIGINT/SIGTERM the server stops accepting connections, finishes open
/// requests, then waits up to `shutdown_timeout_seconds` for queued clicks.
///
/// # Errors
///
/// Returns an error if:
/// - A backend connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let backends = connect_backends(&config).await?;
    let (link_service, stats_service) = build_services(&config, backends);

    let (click_dispatcher, click_rx) = ClickDispatcher::channel(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(
        click_rx,
        stats_service.clone(),
        config.click_worker_concurrency,
    ));

    let state = AppState {
        link_service,
        stats_service,
        click_dispatcher,
        base_url: config.base_url.trim_end_matches('/').to_string(),
    };

    let app = app_router(state, &config)?;

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, draining click queue");

    let drain_limit = Duration::from_secs(config.shutdown_timeout_seconds);
    match tokio::time::timeout(drain_limit, worker).await {
        Ok(Ok(report)) => tracing::info!(
            recorded = report.recorded,
            failed = report.failed,
            "Click worker finished"
        ),
        Ok(Err(e)) => tracing::error!(error = %e, "Click worker panicked"),
        Err(_) => tracing::warn!(
            timeout_secs = config.shutdown_timeout_seconds,
            "Click queue not drained before shutdown timeout"
        ),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
