//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::application::services::{LinkService, StatsService};
use crate::domain::click_worker::ClickDispatcher;
use crate::domain::repositories::{ClickRepository, LinkRepository};

pub type DynLinkService = LinkService<dyn LinkRepository>;
pub type DynStatsService = StatsService<dyn LinkRepository, dyn ClickRepository>;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<DynLinkService>,
    pub stats_service: Arc<DynStatsService>,
    pub click_dispatcher: ClickDispatcher,
    /// Prefix for generated short URLs, without a trailing slash.
    pub base_url: String,
}
