//! Repository trait for click events.

use crate::domain::entities::{ClickEvent, NewClickEvent};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the append-only click log.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryClickRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends a click event.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Backend`] on storage errors.
    async fn append(&self, new_click: NewClickEvent) -> Result<ClickEvent, AppError>;

    /// Lists up to `limit` events for a link, newest first.
    async fn list_recent(&self, link_id: i64, limit: i64) -> Result<Vec<ClickEvent>, AppError>;

    /// Counts all stored events for a link.
    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError>;
}
