//! Repository trait for short link data access.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// Codes are unique across the whole record set, active and inactive alike.
/// Deadlines are applied by the caller; dropping a returned future cancels the
/// underlying operation.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new short link and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateCode`] if the code (or alias) is already
    /// present in the store.
    /// Returns [`AppError::Backend`] on storage errors.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by its short code, regardless of its active flag.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Finds a link by its custom alias, regardless of its active flag.
    async fn find_by_alias(&self, alias: &str) -> Result<Option<ShortLink>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ShortLink>, AppError>;

    /// Persists the mutable fields (`target`, `expires_at`) of an existing link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has `link.id`.
    /// Returns [`AppError::Backend`] on storage errors.
    async fn update(&self, link: &ShortLink) -> Result<ShortLink, AppError>;

    /// Marks a link inactive.
    ///
    /// Returns `Ok(true)` if an active link was deactivated, `Ok(false)` if no
    /// link has `id` or it was already inactive.
    async fn soft_delete(&self, id: i64) -> Result<bool, AppError>;

    /// Atomically adds one to the click counter of `code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    /// Returns [`AppError::Backend`] on storage errors.
    async fn increment_clicks(&self, code: &str) -> Result<(), AppError>;

    async fn exists_code(&self, code: &str) -> Result<bool, AppError>;

    async fn exists_alias(&self, alias: &str) -> Result<bool, AppError>;

    /// Returns true if the store answers a trivial query.
    async fn health_check(&self) -> bool;
}
