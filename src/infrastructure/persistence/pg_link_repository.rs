//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, is_unique_violation};

const CODE_CONSTRAINT: &str = "short_links_code_key";
const ALIAS_CONSTRAINT: &str = "short_links_custom_alias_key";

const LINK_COLUMNS: &str =
    "id, code, custom_alias, target, created_at, expires_at, click_count, created_by, active";

#[derive(FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    custom_alias: Option<String>,
    target: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    click_count: i64,
    created_by: String,
    active: bool,
}

impl From<LinkRow> for ShortLink {
    fn from(row: LinkRow) -> Self {
        ShortLink {
            id: row.id,
            code: row.code,
            custom_alias: row.custom_alias,
            target: row.target,
            created_at: row.created_at,
            expires_at: row.expires_at,
            click_count: row.click_count,
            created_by: row.created_by,
            active: row.active,
        }
    }
}

/// PostgreSQL repository for short links.
///
/// Code and alias uniqueness are enforced by table constraints, so concurrent
/// inserts of the same code are settled by the database.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<ShortLink>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM short_links WHERE {column} = $1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(value)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ShortLink::from))
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let sql = format!(
            r#"
            INSERT INTO short_links (code, custom_alias, target, created_by, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {LINK_COLUMNS}
            "#
        );

        let result = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(&new_link.code)
            .bind(&new_link.custom_alias)
            .bind(&new_link.target)
            .bind(&new_link.created_by)
            .bind(new_link.created_at)
            .bind(new_link.expires_at)
            .fetch_one(self.pool.as_ref())
            .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(e)
                if is_unique_violation(&e, CODE_CONSTRAINT)
                    || is_unique_violation(&e, ALIAS_CONSTRAINT) =>
            {
                Err(AppError::DuplicateCode {
                    code: new_link.code,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        self.find_one("code", code).await
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<ShortLink>, AppError> {
        self.find_one("custom_alias", alias).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ShortLink>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM short_links WHERE id = $1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ShortLink::from))
    }

    async fn update(&self, link: &ShortLink) -> Result<ShortLink, AppError> {
        let sql = format!(
            r#"
            UPDATE short_links
            SET target = $2, expires_at = $3
            WHERE id = $1
            RETURNING {LINK_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(link.id)
            .bind(&link.target)
            .bind(link.expires_at)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(ShortLink::from)
            .ok_or_else(|| AppError::not_found(link.id.to_string()))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE short_links SET active = FALSE WHERE id = $1 AND active")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE short_links SET click_count = click_count + 1 WHERE code = $1")
                .bind(code)
                .execute(self.pool.as_ref())
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(code));
        }
        Ok(())
    }

    async fn exists_code(&self, code: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM short_links WHERE code = $1)",
        )
        .bind(code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn exists_alias(&self, alias: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM short_links WHERE custom_alias = $1)",
        )
        .bind(alias)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
