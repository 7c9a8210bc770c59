//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use std::net::SocketAddr;
use tracing::debug;

use crate::domain::click_job::ClickJob;
use crate::domain::entities::ClickMeta;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code or alias to its target URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code through the cache-aside store (alias as fallback)
/// 2. Check the link is active and not expired
/// 3. Queue a click job for the background worker
/// 4. Return 302 Found
///
/// # Click Tracking
///
/// Clicks are queued with `try_send`. If the queue is full the click is
/// dropped and the redirect still succeeds.
///
/// # Errors
///
/// Returns 404 if nothing matches, 410 if the link is inactive or expired.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.get_short_link(&code).await?;

    let meta = ClickMeta {
        client_ip: Some(addr.ip().to_string()),
        user_agent: header_value(&headers, header::USER_AGENT),
        referer: header_value(&headers, header::REFERER),
    };

    if !state.click_dispatcher.dispatch(ClickJob::new(link.code, meta)) {
        debug!(%code, "Redirect served without click tracking");
    }

    Ok((StatusCode::FOUND, [(header::LOCATION, link.target)]))
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
