//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{ClickEvent, NewClickEvent};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

#[derive(FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    occurred_at: DateTime<Utc>,
    client_ip: Option<String>,
    user_agent: Option<String>,
    referer: Option<String>,
    country_code: Option<String>,
    city: Option<String>,
}

impl From<ClickRow> for ClickEvent {
    fn from(row: ClickRow) -> Self {
        ClickEvent {
            id: row.id,
            link_id: row.link_id,
            occurred_at: row.occurred_at,
            client_ip: row.client_ip,
            user_agent: row.user_agent,
            referer: row.referer,
            country_code: row.country_code,
            city: row.city,
        }
    }
}

/// PostgreSQL repository for the click log.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn append(&self, new_click: NewClickEvent) -> Result<ClickEvent, AppError> {
        let row = sqlx::query_as::<_, ClickRow>(
            r#"
            INSERT INTO click_events (link_id, occurred_at, client_ip, user_agent, referer)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, link_id, occurred_at, client_ip, user_agent, referer, country_code, city
            "#,
        )
        .bind(new_click.link_id)
        .bind(new_click.occurred_at)
        .bind(new_click.client_ip)
        .bind(new_click.user_agent)
        .bind(new_click.referer)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list_recent(&self, link_id: i64, limit: i64) -> Result<Vec<ClickEvent>, AppError> {
        let rows = sqlx::query_as::<_, ClickRow>(
            r#"
            SELECT id, link_id, occurred_at, client_ip, user_agent, referer, country_code, city
            FROM click_events
            WHERE link_id = $1
            ORDER BY occurred_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(link_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(ClickEvent::from).collect())
    }

    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM click_events WHERE link_id = $1")
                .bind(link_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }
}
