//! Database connection pool management and schema setup.

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::config::Config;

/// Schema for the configuration store.
///
/// Idempotent: every statement is `CREATE ... IF NOT EXISTS`, so the
/// schema can be (re)applied on every startup.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS navigation (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    target_url TEXT NOT NULL,
    position INTEGER NOT NULL DEFAULT 0,
    parent_id INTEGER REFERENCES navigation(id),
    is_active INTEGER NOT NULL DEFAULT 1,
    open_in_new_tab INTEGER NOT NULL DEFAULT 0,
    css_class TEXT,
    created INTEGER NOT NULL,
    changed INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS navigation_parent_idx ON navigation (parent_id, position);

CREATE TABLE IF NOT EXISTS branding (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    primary_color TEXT NOT NULL,
    secondary_color TEXT NOT NULL,
    accent_color TEXT NOT NULL,
    dark_color TEXT NOT NULL,
    light_color TEXT NOT NULL,
    font_family TEXT NOT NULL,
    custom_css TEXT NOT NULL DEFAULT '',
    version INTEGER NOT NULL DEFAULT 0,
    changed INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS social_media (
    platform TEXT PRIMARY KEY,
    handle TEXT NOT NULL,
    url TEXT NOT NULL DEFAULT '',
    enabled INTEGER NOT NULL DEFAULT 1,
    changed INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    changed INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT UNIQUE NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL DEFAULT '',
    template TEXT NOT NULL DEFAULT 'page',
    description TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'draft',
    created INTEGER NOT NULL,
    changed INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT UNIQUE NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL DEFAULT '',
    template TEXT NOT NULL DEFAULT 'article',
    category TEXT NOT NULL DEFAULT '',
    excerpt TEXT NOT NULL DEFAULT '',
    author TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'draft',
    created INTEGER NOT NULL,
    changed INTEGER NOT NULL
);
"#;

/// Create a sqlite connection pool.
pub async fn create_pool(config: &Config) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .context("invalid DATABASE_URL")?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("failed to open sqlite database")?;

    Ok(pool)
}

/// Apply the schema. Safe to call on every startup.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .context("failed to apply schema")?;

    Ok(())
}

/// Check if the database connection is healthy.
pub async fn check_health(pool: &SqlitePool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}
