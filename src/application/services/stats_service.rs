//! Click accounting and statistics service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::click_job::ClickJob;
use crate::domain::click_worker::ClickSink;
use crate::domain::entities::{ClickEvent, ClickMeta, NewClickEvent, ShortLink};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;
use crate::utils::deadline::with_deadline;

/// Number of click events returned by [`StatsService::get_stats`].
pub const RECENT_CLICKS_LIMIT: i64 = 100;

/// Statistics for a single link.
#[derive(Debug, Clone)]
pub struct LinkStats {
    pub link: ShortLink,
    /// Newest first, at most [`RECENT_CLICKS_LIMIT`] entries.
    pub recent_clicks: Vec<ClickEvent>,
    /// Total click events stored for the link. May trail `link.click_count`
    /// when event appends were dropped.
    pub recorded_events: i64,
}

/// Service for recording clicks and reading statistics.
///
/// Reads here go straight to the repositories; the cached copy of a link may
/// carry a stale click counter.
pub struct StatsService<L: LinkRepository + ?Sized, C: ClickRepository + ?Sized> {
    links: Arc<L>,
    clicks: Arc<C>,
    store_timeout: Duration,
}

impl<L: LinkRepository + ?Sized, C: ClickRepository + ?Sized> StatsService<L, C> {
    pub fn new(links: Arc<L>, clicks: Arc<C>, store_timeout: Duration) -> Self {
        Self {
            links,
            clicks,
            store_timeout,
        }
    }

    /// Records one redirect of `code`.
    ///
    /// The counter increment is a single atomic store operation. Appending the
    /// click event is best-effort: a failure is logged and the call still
    /// succeeds. No access check is made here; the redirect path already did.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    /// Returns [`AppError::Backend`] if the lookup or increment fails.
    pub async fn record_click(&self, code: &str, meta: ClickMeta) -> Result<(), AppError> {
        let link = self.find_link(code).await?;

        with_deadline(
            "increment_clicks",
            self.store_timeout,
            self.links.increment_clicks(code),
        )
        .await??;

        let new_click = NewClickEvent::new(link.id, meta, Utc::now());
        match with_deadline("append_click", self.store_timeout, self.clicks.append(new_click)).await
        {
            Ok(Ok(event)) => debug!(code, link_id = link.id, click_id = event.id, "Click recorded"),
            Ok(Err(e)) => warn!(code, link_id = link.id, error = %e, "Failed to store click event"),
            Err(e) => warn!(code, link_id = link.id, error = %e, "Failed to store click event"),
        }

        Ok(())
    }

    /// Returns the authoritative record of `code` with its recent clicks.
    ///
    /// Works for inactive and expired links too. An empty click list is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    /// Returns [`AppError::Backend`] on storage errors.
    pub async fn get_stats(&self, code: &str) -> Result<LinkStats, AppError> {
        let link = self.find_link(code).await?;

        let recent_clicks = with_deadline(
            "list_recent_clicks",
            self.store_timeout,
            self.clicks.list_recent(link.id, RECENT_CLICKS_LIMIT),
        )
        .await??;

        let recorded_events = with_deadline(
            "count_clicks",
            self.store_timeout,
            self.clicks.count_for_link(link.id),
        )
        .await??;

        Ok(LinkStats {
            link,
            recent_clicks,
            recorded_events,
        })
    }

    async fn find_link(&self, code: &str) -> Result<ShortLink, AppError> {
        with_deadline("find_by_code", self.store_timeout, self.links.find_by_code(code))
            .await??
            .ok_or_else(|| AppError::not_found(code))
    }
}

#[async_trait]
impl<L, C> ClickSink for StatsService<L, C>
where
    L: LinkRepository + ?Sized,
    C: ClickRepository + ?Sized,
{
    async fn record(&self, job: ClickJob) -> Result<(), AppError> {
        self.record_click(&job.code, job.meta).await
    }
}
