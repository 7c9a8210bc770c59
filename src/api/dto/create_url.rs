//! DTOs for the link creation endpoint.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::CreateShortLink;

/// Creator recorded when the request does not name one.
pub const ANONYMOUS_CREATOR: &str = "anonymous";

/// Request body for `POST /api/v1/urls`.
///
/// URL scheme and alias syntax are checked by the service, so their errors
/// carry the `invalid_target` / `invalid_alias` codes rather than
/// `validation_error`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUrlRequest {
    #[validate(length(max = 2048, message = "URL is too long"))]
    pub url: String,

    /// Optional caller-chosen code.
    pub custom_alias: Option<String>,

    /// Lifetime in hours. Absent or zero means the link never expires.
    #[validate(range(min = 0, max = 87600, message = "must be between 0 and 87600 hours"))]
    pub expires_in_hours: Option<i64>,

    #[validate(length(min = 1, max = 64))]
    pub created_by: Option<String>,
}

impl From<CreateUrlRequest> for CreateShortLink {
    fn from(request: CreateUrlRequest) -> Self {
        Self {
            target: request.url,
            alias: request.custom_alias,
            created_by: request
                .created_by
                .unwrap_or_else(|| ANONYMOUS_CREATOR.to_string()),
            ttl: request.expires_in_hours.map(TimeDelta::hours),
        }
    }
}

/// Response for a newly created link.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUrlResponse {
    pub id: i64,
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}
