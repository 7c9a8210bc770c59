//! Business logic services for the application layer.

pub mod link_service;
pub mod stats_service;

pub use link_service::{CreateShortLink, LinkService, MAX_CODE_ATTEMPTS, short_url};
pub use stats_service::{LinkStats, RECENT_CLICKS_LIMIT, StatsService};
