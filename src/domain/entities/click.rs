//! Click entity representing a single redirect event.

use chrono::{DateTime, Utc};

/// A click event recorded when a shortened link is followed.
///
/// Append-only: events are never updated, and soft-deleting the parent link
/// leaves them in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub id: i64,
    pub link_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub country_code: Option<String>,
    pub city: Option<String>,
}

/// Client metadata captured from a redirect request.
///
/// All fields are optional to handle missing headers gracefully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickMeta {
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// Input data for appending a click event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClickEvent {
    pub link_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl NewClickEvent {
    pub fn new(link_id: i64, meta: ClickMeta, occurred_at: DateTime<Utc>) -> Self {
        Self {
            link_id,
            occurred_at,
            client_ip: meta.client_ip,
            user_agent: meta.user_agent,
            referer: meta.referer,
        }
    }

    /// Materializes the event once the store has assigned an id.
    ///
    /// Geolocation fields stay empty; no lookup is performed.
    pub fn into_event(self, id: i64) -> ClickEvent {
        ClickEvent {
            id,
            link_id: self.link_id,
            occurred_at: self.occurred_at,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            referer: self.referer,
            country_code: None,
            city: None,
        }
    }
}
