#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use shortlink::application::services::CreateShortLink;
use shortlink::config::Config;
use shortlink::domain::click_job::ClickJob;
use shortlink::domain::click_worker::ClickDispatcher;
use shortlink::infrastructure::cache::{CacheError, CacheResult, CacheService, MemoryCache};
use shortlink::infrastructure::persistence::{MemoryClickRepository, MemoryLinkRepository};
use shortlink::server::{Backends, build_services};
use shortlink::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;

pub const BASE_URL: &str = "http://sho.rt";

/// Application state over in-memory backends, with handles to inspect them.
pub struct TestApp {
    pub state: AppState,
    pub links: Arc<MemoryLinkRepository>,
    pub clicks: Arc<MemoryClickRepository>,
    pub click_rx: mpsc::Receiver<ClickJob>,
}

pub fn test_config() -> Config {
    Config {
        cache_timeout_ms: 100,
        store_timeout_ms: 1000,
        ..Config::default()
    }
}

pub fn create_test_app() -> TestApp {
    create_test_app_with_cache(Arc::new(MemoryCache::new()))
}

pub fn create_test_app_with_cache(cache: Arc<dyn CacheService>) -> TestApp {
    let links = Arc::new(MemoryLinkRepository::new());
    let clicks = Arc::new(MemoryClickRepository::new());

    let (link_service, stats_service) = build_services(
        &test_config(),
        Backends {
            links: links.clone(),
            clicks: clicks.clone(),
            cache,
        },
    );

    let (click_dispatcher, click_rx) = ClickDispatcher::channel(100);

    let state = AppState {
        link_service,
        stats_service,
        click_dispatcher,
        base_url: BASE_URL.to_string(),
    };

    TestApp {
        state,
        links,
        clicks,
        click_rx,
    }
}

pub fn create_request(target: &str) -> CreateShortLink {
    CreateShortLink {
        target: target.to_string(),
        alias: None,
        created_by: "u1".to_string(),
        ttl: None,
    }
}

pub fn create_alias_request(target: &str, alias: &str) -> CreateShortLink {
    CreateShortLink {
        alias: Some(alias.to_string()),
        ..create_request(target)
    }
}

/// Cache whose every call fails.
pub struct FailingCache;

#[async_trait]
impl CacheService for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

/// Cache that never answers within any reasonable deadline.
pub struct HangingCache;

#[async_trait]
impl CacheService for HangingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> CacheResult<()> {
        std::future::pending().await
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        std::future::pending().await
    }

    async fn health_check(&self) -> bool {
        std::future::pending().await
    }
}

/// Inserts a fixed peer address, as `into_make_service_with_connect_info` would.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
