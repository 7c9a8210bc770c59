//! Top-level router assembly.

use axum::{Router, routing::get};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api::handlers::health_handler;
use crate::api::middleware::{rate_limit, tracing};
use crate::api::routes::{api_routes, redirect_routes};
use crate::config::Config;
use crate::state::AppState;

/// Every route without middleware. Handy for tests that supply their own
/// connection info.
pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/v1", api_routes())
        .merge(redirect_routes())
}

/// Builds the application router.
///
/// API and redirect routes are rate limited per client IP; `/health` is not.
/// Trailing slashes are trimmed before routing.
///
/// # Errors
///
/// Fails if the rate limit settings are rejected.
pub fn app_router(state: AppState, config: &Config) -> anyhow::Result<NormalizePath<Router>> {
    let limited = Router::new()
        .nest("/api/v1", api_routes())
        .merge(redirect_routes());

    let limited = if config.behind_proxy {
        limited.layer(rate_limit::forwarded_layer(
            config.rate_limit_per_second,
            config.rate_limit_burst,
        )?)
    } else {
        limited.layer(rate_limit::layer(
            config.rate_limit_per_second,
            config.rate_limit_burst,
        )?)
    };

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(limited)
        .layer(tracing::layer())
        .with_state(state);

    Ok(NormalizePathLayer::trim_trailing_slash().layer(router))
}
