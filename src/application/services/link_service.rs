//! Short link allocation and access service.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::application::link_store::CachedLinkStore;
use crate::domain::entities::{LinkPatch, NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::domain::validation::{validate_alias, validate_target};
use crate::error::AppError;
use crate::utils::code_generator::{DEFAULT_CODE_LENGTH, generate_code};
use crate::utils::deadline::with_deadline;

/// Upper bound on generated-code candidates for a single create.
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Builds the public URL for `code`.
pub fn short_url(base_url: &str, code: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), code)
}

/// Input for [`LinkService::create_short_link`].
#[derive(Debug, Clone, Default)]
pub struct CreateShortLink {
    pub target: String,
    /// Caller-chosen code. `None` or empty means generate one.
    pub alias: Option<String>,
    pub created_by: String,
    /// Lifetime of the link. `None` or zero means it never expires.
    pub ttl: Option<TimeDelta>,
}

/// Service for creating, resolving, updating and deleting short links.
///
/// All record access goes through [`CachedLinkStore`]; the service itself
/// keeps no mutable state.
pub struct LinkService<L: LinkRepository + ?Sized> {
    store: Arc<CachedLinkStore<L>>,
    code_length: usize,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    pub fn new(store: Arc<CachedLinkStore<L>>) -> Self {
        Self::with_code_length(store, DEFAULT_CODE_LENGTH)
    }

    pub fn with_code_length(store: Arc<CachedLinkStore<L>>, code_length: usize) -> Self {
        Self { store, code_length }
    }

    pub fn store(&self) -> &Arc<CachedLinkStore<L>> {
        &self.store
    }

    /// Creates a short link.
    ///
    /// # Code Resolution
    ///
    /// - With an alias: the alias is validated, must not exist as an alias or
    ///   as a code (active or not), and becomes the code
    /// - Without: random codes are drawn until one is free, at most
    ///   [`MAX_CODE_ATTEMPTS`] times
    ///
    /// The target URL is validated after the code is resolved. Nothing is
    /// persisted unless every check passes.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidAlias`] / [`AppError::AliasTaken`] for alias problems
    /// - [`AppError::CodeSpaceExhausted`] when every candidate collided
    /// - [`AppError::InvalidTarget`] if the URL is rejected
    /// - [`AppError::Backend`] if the store fails
    pub async fn create_short_link(&self, request: CreateShortLink) -> Result<ShortLink, AppError> {
        let CreateShortLink {
            target,
            alias,
            created_by,
            ttl,
        } = request;

        match alias.filter(|alias| !alias.is_empty()) {
            Some(alias) => self.create_with_alias(target, alias, created_by, ttl).await,
            None => self.create_with_generated_code(target, created_by, ttl).await,
        }
    }

    async fn create_with_alias(
        &self,
        target: String,
        alias: String,
        created_by: String,
        ttl: Option<TimeDelta>,
    ) -> Result<ShortLink, AppError> {
        validate_alias(&alias)?;

        let repository = self.store.repository();
        let timeout = self.store.settings().store_timeout;

        let taken = with_deadline("exists_alias", timeout, repository.exists_alias(&alias))
            .await??
            || with_deadline("exists_code", timeout, repository.exists_code(&alias)).await??;
        if taken {
            return Err(AppError::AliasTaken { alias });
        }

        validate_target(&target)?;

        let new_link = NewShortLink::new(
            alias.clone(),
            Some(alias.clone()),
            target.trim().to_string(),
            created_by,
            ttl,
            Utc::now(),
        )?;

        match self.store.store(new_link).await {
            Ok(link) => {
                info!(code = %link.code, link_id = link.id, "Created short link with custom alias");
                Ok(link)
            }
            Err(AppError::DuplicateCode { .. }) => Err(AppError::AliasTaken { alias }),
            Err(e) => Err(e),
        }
    }

    async fn create_with_generated_code(
        &self,
        target: String,
        created_by: String,
        ttl: Option<TimeDelta>,
    ) -> Result<ShortLink, AppError> {
        let repository = self.store.repository();
        let timeout = self.store.settings().store_timeout;
        let mut target_checked = false;

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_code(self.code_length);

            if with_deadline("exists_code", timeout, repository.exists_code(&code)).await?? {
                debug!(attempt, "Generated code already exists, drawing another");
                continue;
            }

            if !target_checked {
                validate_target(&target)?;
                target_checked = true;
            }

            let new_link = NewShortLink::new(
                code,
                None,
                target.trim().to_string(),
                created_by.clone(),
                ttl,
                Utc::now(),
            )?;

            match self.store.store(new_link).await {
                Ok(link) => {
                    info!(code = %link.code, link_id = link.id, attempt, "Created short link");
                    return Ok(link);
                }
                Err(AppError::DuplicateCode { code }) => {
                    warn!(%code, attempt, "Concurrent insert claimed generated code, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(attempts = MAX_CODE_ATTEMPTS, "Short code space exhausted");
        Err(AppError::CodeSpaceExhausted {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }

    /// Resolves a code or alias to an accessible link.
    ///
    /// The access policy is applied on every call, including cache hits.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if neither a code nor an alias matches
    /// - [`AppError::Inactive`] for soft-deleted links
    /// - [`AppError::Expired`] once the expiry time has passed
    /// - [`AppError::Backend`] if the store fails
    pub async fn get_short_link(&self, code_or_alias: &str) -> Result<ShortLink, AppError> {
        if code_or_alias.is_empty() {
            return Err(AppError::not_found(code_or_alias));
        }

        let link = match self.store.lookup(code_or_alias).await? {
            Some(link) => link,
            None => self
                .store
                .lookup_alias(code_or_alias)
                .await?
                .ok_or_else(|| AppError::not_found(code_or_alias))?,
        };

        link.check_access()?;

        Ok(link)
    }

    /// Changes the target and/or expiry of an active link.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the patch changes nothing
    /// - [`AppError::InvalidTarget`] if the new target is rejected
    /// - [`AppError::NotFound`] if no link has `id`
    /// - [`AppError::Inactive`] if the link was deleted
    pub async fn update_short_link(&self, id: i64, patch: LinkPatch) -> Result<ShortLink, AppError> {
        if patch.is_empty() {
            return Err(AppError::bad_request(
                "Update must set url or expires_at",
                json!({ "fields": ["url", "expires_at"] }),
            ));
        }

        let patch = match patch.target {
            Some(target) => {
                validate_target(&target)?;
                LinkPatch {
                    target: Some(target.trim().to_string()),
                    ..patch
                }
            }
            None => patch,
        };

        let link = self.find_by_id(id).await?;
        if !link.active {
            return Err(AppError::Inactive { code: link.code });
        }

        let timeout = self.store.settings().store_timeout;
        let updated = patch.apply(link);
        let saved = with_deadline("update", timeout, self.store.repository().update(&updated))
            .await??;

        self.invalidate_link(&saved).await;
        info!(code = %saved.code, link_id = id, "Updated short link");

        Ok(saved)
    }

    /// Soft-deletes a link and drops its cache entries.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no link has `id` or it is already deleted
    /// - [`AppError::Backend`] if the store fails
    pub async fn delete_short_link(&self, id: i64) -> Result<(), AppError> {
        let link = self.find_by_id(id).await?;

        let timeout = self.store.settings().store_timeout;
        let deleted =
            with_deadline("soft_delete", timeout, self.store.repository().soft_delete(id)).await??;
        if !deleted {
            return Err(AppError::not_found(id.to_string()));
        }

        self.invalidate_link(&link).await;
        info!(code = %link.code, link_id = id, "Deleted short link");

        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<ShortLink, AppError> {
        let timeout = self.store.settings().store_timeout;

        with_deadline("find_by_id", timeout, self.store.repository().find_by_id(id))
            .await??
            .ok_or_else(|| AppError::not_found(id.to_string()))
    }

    async fn invalidate_link(&self, link: &ShortLink) {
        self.store.invalidate(&link.code).await;

        if let Some(alias) = link.custom_alias.as_deref() {
            if alias != link.code {
                self.store.invalidate(alias).await;
            }
        }
    }
}
