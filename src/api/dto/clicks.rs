//! DTOs for click event data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::ClickEvent;

/// Individual click event information.
///
/// Optional fields are omitted from JSON when `None`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClickInfo {
    pub clicked_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl From<ClickEvent> for ClickInfo {
    fn from(event: ClickEvent) -> Self {
        Self {
            clicked_at: event.occurred_at,
            user_agent: event.user_agent,
            referer: event.referer,
            ip: event.client_ip,
            country_code: event.country_code,
        }
    }
}
