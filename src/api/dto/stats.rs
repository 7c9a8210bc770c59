//! DTOs for link statistics.

use serde::{Deserialize, Serialize};

use super::clicks::ClickInfo;
use super::link::LinkResponse;
use crate::application::services::LinkStats;

/// Statistics for a single short link.
///
/// `clicks` is the authoritative redirect counter. `recorded_events` counts
/// stored click events and may be lower when event writes were dropped.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub link: LinkResponse,
    pub recorded_events: i64,
    pub recent_clicks: Vec<ClickInfo>,
}

impl StatsResponse {
    pub fn from_stats(stats: LinkStats, base_url: &str) -> Self {
        Self {
            link: LinkResponse::from_link(stats.link, base_url),
            recorded_events: stats.recorded_events,
            recent_clicks: stats.recent_clicks.into_iter().map(ClickInfo::from).collect(),
        }
    }
}
