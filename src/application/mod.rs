//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository and
//! cache calls, validation, and business rules.
//!
//! # Components
//!
//! - [`link_store::CachedLinkStore`] - Cache-aside access to link records
//! - [`services::link_service::LinkService`] - Short link allocation and resolution
//! - [`services::stats_service::StatsService`] - Click accounting and statistics

pub mod link_store;
pub mod services;
