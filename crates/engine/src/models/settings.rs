//! Free-form site settings — a JSON key-value store for configuration
//! owned by neither navigation, branding, nor content.

use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::error::{EngineError, EngineResult};

/// Well-known keys for site metadata. These feed the shared script, and
/// `site_name` is additionally baked into page headers.
pub const SITE_NAME: &str = "site_name";
pub const SITE_URL: &str = "site_url";
pub const SITE_DESCRIPTION: &str = "site_description";

const DEFAULT_SITE_NAME: &str = "My Website";

/// Raw setting row. Values are stored as JSON text.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub changed: i64,
}

/// Site metadata assembled from the well-known keys, with defaults
/// substituted for anything unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteMetadata {
    pub name: String,
    pub url: String,
    pub description: String,
}

/// Get a setting value by key.
pub async fn get(
    conn: &mut SqliteConnection,
    key: &str,
) -> EngineResult<Option<serde_json::Value>> {
    let raw: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?;

    match raw {
        Some(text) => {
            let value = serde_json::from_str(&text)
                .map_err(|e| EngineError::Internal(anyhow::anyhow!("corrupt setting {key}: {e}")))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Set a setting value.
pub async fn set(
    conn: &mut SqliteConnection,
    key: &str,
    value: &serde_json::Value,
) -> EngineResult<()> {
    if key.trim().is_empty() {
        return Err(EngineError::Validation(
            "setting key must not be empty".to_string(),
        ));
    }

    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO settings (key, value, changed)
        VALUES (?, ?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, changed = excluded.changed
        "#,
    )
    .bind(key)
    .bind(value.to_string())
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Fetch a string setting, falling back to a default.
async fn get_string(conn: &mut SqliteConnection, key: &str, default: &str) -> EngineResult<String> {
    let value = get(&mut *conn, key).await?;
    Ok(value
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_else(|| default.to_string()))
}

/// Assemble the site metadata embedded in the shared script and baked
/// into page headers.
pub async fn site_metadata(conn: &mut SqliteConnection) -> EngineResult<SiteMetadata> {
    let name = get_string(&mut *conn, SITE_NAME, DEFAULT_SITE_NAME).await?;
    let url = get_string(&mut *conn, SITE_URL, "").await?;
    let description = get_string(&mut *conn, SITE_DESCRIPTION, "").await?;

    Ok(SiteMetadata {
        name,
        url,
        description,
    })
}
