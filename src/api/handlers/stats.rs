//! Handler for link statistics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the click counter and recent click events of a link.
///
/// # Endpoint
///
/// `GET /api/v1/urls/{code}/stats`
///
/// Reads the authoritative record, so inactive and expired links are
/// reported too.
///
/// # Errors
///
/// Returns 404 Not Found if no link has this code.
pub async fn stats_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.stats_service.get_stats(&code).await?;

    Ok(Json(StatsResponse::from_stats(stats, &state.base_url)))
}
