//! Handlers for link management endpoints (update, delete).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::link::LinkResponse;
use crate::api::dto::update_url::UpdateUrlRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Partially updates a short link.
///
/// # Endpoint
///
/// `PATCH /api/v1/urls/{id}`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://new-destination.com",
///   "expires_at": "2026-12-31T23:59:59Z"  // null to clear
/// }
/// ```
///
/// The cached record is invalidated so the next redirect sees the change.
///
/// # Errors
///
/// - 404 if the link doesn't exist
/// - 410 if the link was deleted
/// - 400 if the new URL is invalid
pub async fn update_link_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateUrlRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .update_short_link(id, payload.into())
        .await?;

    Ok(Json(LinkResponse::from_link(link, &state.base_url)))
}

/// Soft-deletes a short link.
///
/// # Endpoint
///
/// `DELETE /api/v1/urls/{id}`
///
/// The record stays in storage with `active = false`; redirects answer
/// 410 Gone from then on. Cached copies under the code and alias are dropped.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist or is already deleted.
pub async fn delete_link_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_short_link(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
