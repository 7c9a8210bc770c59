//! In-process implementation of link repository.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Link repository kept in process memory.
///
/// Mirrors the guarantees of the SQL schema: codes and aliases are reserved
/// atomically on insert, and click increments happen under the record's lock.
/// Data is lost when the process exits.
pub struct MemoryLinkRepository {
    next_id: AtomicI64,
    links: DashMap<i64, ShortLink>,
    codes: DashMap<String, i64>,
    aliases: DashMap<String, i64>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            links: DashMap::new(),
            codes: DashMap::new(),
            aliases: DashMap::new(),
        }
    }

    /// Number of stored links, active or not.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    fn get_by_id(&self, id: i64) -> Option<ShortLink> {
        self.links.get(&id).map(|link| link.clone())
    }
}

impl Default for MemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        // Lock order is codes, then aliases, then links.
        let code_slot = match self.codes.entry(new_link.code.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::DuplicateCode {
                    code: new_link.code,
                });
            }
            Entry::Vacant(slot) => slot,
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        if let Some(alias) = &new_link.custom_alias {
            match self.aliases.entry(alias.clone()) {
                Entry::Occupied(_) => {
                    return Err(AppError::DuplicateCode {
                        code: new_link.code,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }

        let link = new_link.into_link(id);
        self.links.insert(id, link.clone());
        code_slot.insert(id);

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let Some(id) = self.codes.get(code).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.get_by_id(id))
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<ShortLink>, AppError> {
        let Some(id) = self.aliases.get(alias).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.get_by_id(id))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ShortLink>, AppError> {
        Ok(self.get_by_id(id))
    }

    async fn update(&self, link: &ShortLink) -> Result<ShortLink, AppError> {
        let mut stored = self
            .links
            .get_mut(&link.id)
            .ok_or_else(|| AppError::not_found(link.id.to_string()))?;

        stored.target = link.target.clone();
        stored.expires_at = link.expires_at;

        Ok(stored.clone())
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        match self.links.get_mut(&id) {
            Some(mut link) if link.active => {
                link.active = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        let id = self
            .codes
            .get(code)
            .map(|id| *id)
            .ok_or_else(|| AppError::not_found(code))?;

        let mut link = self
            .links
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(code))?;
        link.click_count += 1;

        Ok(())
    }

    async fn exists_code(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.codes.contains_key(code))
    }

    async fn exists_alias(&self, alias: &str) -> Result<bool, AppError> {
        Ok(self.aliases.contains_key(alias))
    }

    async fn health_check(&self) -> bool {
        true
    }
}
