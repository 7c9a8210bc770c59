//! JSON representation of a stored link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::short_url;
use crate::domain::entities::ShortLink;

#[derive(Debug, Serialize, Deserialize)]
pub struct LinkResponse {
    pub id: i64,
    pub short_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_alias: Option<String>,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub clicks: i64,
    pub active: bool,
}

impl LinkResponse {
    pub fn from_link(link: ShortLink, base_url: &str) -> Self {
        Self {
            short_url: short_url(base_url, &link.code),
            id: link.id,
            short_code: link.code,
            custom_alias: link.custom_alias,
            original_url: link.target,
            created_at: link.created_at,
            expires_at: link.expires_at,
            created_by: link.created_by,
            clicks: link.click_count,
            active: link.active,
        }
    }
}
