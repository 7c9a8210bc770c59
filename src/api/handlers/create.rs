//! Handler for the link creation endpoint.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::create_url::{CreateUrlRequest, CreateUrlResponse};
use crate::application::services::short_url;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/v1/urls`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/very/long/path",
///   "custom_alias": "docs",        // optional
///   "expires_in_hours": 24,        // optional, 0 = never
///   "created_by": "user-42"        // optional
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "id": 1,
///   "short_code": "docs",
///   "short_url": "http://localhost:8080/docs",
///   "original_url": "https://example.com/very/long/path",
///   "created_at": "2026-01-01T00:00:00Z",
///   "expires_at": "2026-01-02T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 for an invalid URL, alias or request body
/// - 409 if the alias is taken
/// - 503 if no free code was found
pub async fn create_url_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<CreateUrlResponse>), AppError> {
    payload.validate()?;

    let link = state.link_service.create_short_link(payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUrlResponse {
            id: link.id,
            short_url: short_url(&state.base_url, &link.code),
            short_code: link.code,
            original_url: link.target,
            created_at: link.created_at,
            expires_at: link.expires_at,
        }),
    ))
}
