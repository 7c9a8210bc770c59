//! DTO for the link update endpoint.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_with::serde_as;
use validator::Validate;

use crate::domain::entities::LinkPatch;

/// Request body for `PATCH /api/v1/urls/{id}`.
///
/// All fields are optional; only provided fields are changed.
///
/// # `expires_at` semantics
///
/// - **Absent** → leave existing value unchanged
/// - **`null`** → clear expiry (link never expires)
/// - **Timestamp** → set new expiry
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUrlRequest {
    /// New destination URL.
    #[validate(length(max = 2048, message = "URL is too long"))]
    pub url: Option<String>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl From<UpdateUrlRequest> for LinkPatch {
    fn from(request: UpdateUrlRequest) -> Self {
        Self {
            target: request.url,
            expires_at: request.expires_at,
        }
    }
}
