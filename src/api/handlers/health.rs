//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;
use crate::utils::deadline::with_deadline;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: Repository round trip
/// 2. **Click Queue**: Worker still receiving, free slots
/// 3. **Cache**: Backend ping
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_check = check_database(&state).await;
    let queue_check = check_click_queue(&state);
    let cache_check = check_cache(&state).await;

    let all_healthy = db_check.is_ok() && queue_check.is_ok() && cache_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_check,
            click_queue: queue_check,
            cache: cache_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    let store = state.link_service.store();
    let timeout = store.settings().store_timeout;

    match with_deadline("health_check", timeout, store.repository().health_check()).await {
        Ok(true) => CheckStatus::ok("Connected"),
        Ok(false) => CheckStatus::error("Database did not answer"),
        Err(e) => CheckStatus::error(e.to_string()),
    }
}

fn check_click_queue(state: &AppState) -> CheckStatus {
    let dispatcher = &state.click_dispatcher;

    if dispatcher.is_closed() {
        CheckStatus::error("Click queue is closed")
    } else {
        CheckStatus::ok(format!(
            "Available: {}/{}",
            dispatcher.available(),
            dispatcher.max_capacity()
        ))
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    let store = state.link_service.store();

    if store.cache_healthy().await {
        let stats = store.cache_stats();
        CheckStatus::ok(format!(
            "hits: {}, misses: {}, errors: {}",
            stats.hits, stats.misses, stats.errors
        ))
    } else {
        CheckStatus::error("Cache unreachable")
    }
}
