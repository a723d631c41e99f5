//! Page and article records.
//!
//! Owned by the editor collaborator; the generator consumes them
//! read-only. Only published records produce output files.

use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::error::{EngineError, EngineResult};

/// Publication status. Drafts are stored but never rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Draft,
    Published,
}

/// Page record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PageRecord {
    pub id: i64,

    /// Unique slug; the output file is `{slug}.html`.
    pub slug: String,

    pub title: String,

    /// Ready-to-embed HTML body.
    pub body: String,

    /// Template name resolved by the renderer.
    pub template: String,

    pub description: String,

    pub status: ContentStatus,

    pub created: i64,
    pub changed: i64,
}

/// Article record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ArticleRecord {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub template: String,
    pub category: String,
    pub excerpt: String,
    pub author: String,
    pub status: ContentStatus,
    pub created: i64,
    pub changed: i64,
}

/// Input for creating or updating a page, keyed by slug.
#[derive(Debug, Clone, Deserialize)]
pub struct SavePage {
    pub slug: String,
    pub title: String,
    pub body: Option<String>,
    pub template: Option<String>,
    pub description: Option<String>,
    pub status: Option<ContentStatus>,
}

/// Input for creating or updating an article, keyed by slug.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveArticle {
    pub slug: String,
    pub title: String,
    pub body: Option<String>,
    pub template: Option<String>,
    pub category: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub status: Option<ContentStatus>,
}

/// Validate a slug for use as an output filename.
///
/// Slugs become filesystem paths, so anything outside
/// `[a-z0-9][a-z0-9_-]*` is rejected — this also rules out path
/// traversal and hidden files.
pub fn validate_slug(slug: &str) -> EngineResult<()> {
    let mut chars = slug.chars();
    let valid = match chars.next() {
        Some(first) => {
            first.is_ascii_lowercase() || first.is_ascii_digit()
        }
        None => false,
    } && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(EngineError::Validation(format!(
            "slug '{slug}' must match [a-z0-9][a-z0-9_-]*"
        )))
    }
}

impl PageRecord {
    /// Create or update a page by slug. `created` is preserved on update.
    pub async fn upsert(conn: &mut SqliteConnection, input: SavePage) -> EngineResult<Self> {
        validate_slug(&input.slug)?;
        if input.title.trim().is_empty() {
            return Err(EngineError::Validation(
                "title must not be empty".to_string(),
            ));
        }

        let now = chrono::Utc::now().timestamp();
        let body = input.body.unwrap_or_default();
        let template = input.template.unwrap_or_else(|| "page".to_string());
        let description = input.description.unwrap_or_default();
        let status = input.status.unwrap_or(ContentStatus::Draft);

        let page = sqlx::query_as::<_, PageRecord>(
            r#"
            INSERT INTO pages (slug, title, body, template, description, status, created, changed)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(slug) DO UPDATE SET
                title = excluded.title,
                body = excluded.body,
                template = excluded.template,
                description = excluded.description,
                status = excluded.status,
                changed = excluded.changed
            RETURNING id, slug, title, body, template, description, status, created, changed
            "#,
        )
        .bind(&input.slug)
        .bind(&input.title)
        .bind(&body)
        .bind(&template)
        .bind(&description)
        .bind(status)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(page)
    }

    /// Find a page by slug.
    pub async fn find_by_slug(
        conn: &mut SqliteConnection,
        slug: &str,
    ) -> EngineResult<Option<Self>> {
        let page = sqlx::query_as::<_, PageRecord>(
            "SELECT id, slug, title, body, template, description, status, created, changed FROM pages WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(page)
    }

    /// List all pages ordered by slug.
    pub async fn list(conn: &mut SqliteConnection) -> EngineResult<Vec<Self>> {
        let pages = sqlx::query_as::<_, PageRecord>(
            "SELECT id, slug, title, body, template, description, status, created, changed FROM pages ORDER BY slug ASC",
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(pages)
    }

    /// List published pages ordered by slug.
    pub async fn list_published(conn: &mut SqliteConnection) -> EngineResult<Vec<Self>> {
        let pages = sqlx::query_as::<_, PageRecord>(
            "SELECT id, slug, title, body, template, description, status, created, changed FROM pages WHERE status = 'published' ORDER BY slug ASC",
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(pages)
    }
}

impl ArticleRecord {
    /// Create or update an article by slug. `created` is preserved on
    /// update.
    pub async fn upsert(conn: &mut SqliteConnection, input: SaveArticle) -> EngineResult<Self> {
        validate_slug(&input.slug)?;
        if input.title.trim().is_empty() {
            return Err(EngineError::Validation(
                "title must not be empty".to_string(),
            ));
        }

        let now = chrono::Utc::now().timestamp();
        let body = input.body.unwrap_or_default();
        let template = input.template.unwrap_or_else(|| "article".to_string());
        let category = input.category.unwrap_or_default();
        let excerpt = input.excerpt.unwrap_or_default();
        let author = input.author.unwrap_or_default();
        let status = input.status.unwrap_or(ContentStatus::Draft);

        let article = sqlx::query_as::<_, ArticleRecord>(
            r#"
            INSERT INTO articles (slug, title, body, template, category, excerpt, author, status, created, changed)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(slug) DO UPDATE SET
                title = excluded.title,
                body = excluded.body,
                template = excluded.template,
                category = excluded.category,
                excerpt = excluded.excerpt,
                author = excluded.author,
                status = excluded.status,
                changed = excluded.changed
            RETURNING id, slug, title, body, template, category, excerpt, author, status, created, changed
            "#,
        )
        .bind(&input.slug)
        .bind(&input.title)
        .bind(&body)
        .bind(&template)
        .bind(&category)
        .bind(&excerpt)
        .bind(&author)
        .bind(status)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(article)
    }

    /// Find an article by slug.
    pub async fn find_by_slug(
        conn: &mut SqliteConnection,
        slug: &str,
    ) -> EngineResult<Option<Self>> {
        let article = sqlx::query_as::<_, ArticleRecord>(
            "SELECT id, slug, title, body, template, category, excerpt, author, status, created, changed FROM articles WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(article)
    }

    /// List all articles, newest first.
    pub async fn list(conn: &mut SqliteConnection) -> EngineResult<Vec<Self>> {
        let articles = sqlx::query_as::<_, ArticleRecord>(
            "SELECT id, slug, title, body, template, category, excerpt, author, status, created, changed FROM articles ORDER BY created DESC, id DESC",
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(articles)
    }

    /// List published articles, newest first — the article index order.
    pub async fn list_published(conn: &mut SqliteConnection) -> EngineResult<Vec<Self>> {
        let articles = sqlx::query_as::<_, ArticleRecord>(
            "SELECT id, slug, title, body, template, category, excerpt, author, status, created, changed FROM articles WHERE status = 'published' ORDER BY created DESC, id DESC",
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(articles)
    }
}
