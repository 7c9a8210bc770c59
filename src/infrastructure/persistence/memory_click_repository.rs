//! In-process implementation of click repository.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::entities::{ClickEvent, NewClickEvent};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Click log kept in process memory, grouped by link.
pub struct MemoryClickRepository {
    next_id: AtomicI64,
    events: DashMap<i64, Vec<ClickEvent>>,
}

impl MemoryClickRepository {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            events: DashMap::new(),
        }
    }
}

impl Default for MemoryClickRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClickRepository for MemoryClickRepository {
    async fn append(&self, new_click: NewClickEvent) -> Result<ClickEvent, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let event = new_click.into_event(id);

        self.events
            .entry(event.link_id)
            .or_default()
            .push(event.clone());

        Ok(event)
    }

    async fn list_recent(&self, link_id: i64, limit: i64) -> Result<Vec<ClickEvent>, AppError> {
        let Some(events) = self.events.get(&link_id) else {
            return Ok(Vec::new());
        };

        let mut recent = events.clone();
        drop(events);

        recent.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        recent.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(recent)
    }

    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError> {
        let count = self.events.get(&link_id).map_or(0, |events| events.len());
        Ok(count as i64)
    }
}
