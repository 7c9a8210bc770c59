//! API route configuration.

use crate::api::handlers::{
    create_url_handler, delete_link_handler, redirect_handler, stats_handler,
    update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Link management routes, nested under `/api/v1`.
///
/// # Endpoints
///
/// - `POST   /urls`                - Create a short link
/// - `PATCH  /urls/{link}`         - Update target or expiry (by numeric id)
/// - `DELETE /urls/{link}`         - Soft-delete (by numeric id)
/// - `GET    /urls/{link}/stats`   - Click statistics (by code)
///
/// The segment after `/urls/` shares one parameter name so the router sees
/// no conflict between the id and code forms.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/urls", post(create_url_handler))
        .route(
            "/urls/{link}",
            patch(update_link_handler).delete(delete_link_handler),
        )
        .route("/urls/{link}/stats", get(stats_handler))
}

/// The public redirect route.
///
/// - `GET /{code}` - Redirect to the target URL
pub fn redirect_routes() -> Router<AppState> {
    Router::new().route("/{code}", get(redirect_handler))
}
