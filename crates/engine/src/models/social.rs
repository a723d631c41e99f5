//! Social media links — platform-keyed, unordered, overwrite-only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::error::{EngineError, EngineResult};

/// Social link record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SocialLink {
    /// Platform machine name (e.g., "twitter", "github"). Unique key.
    pub platform: String,

    /// Handle shown to visitors.
    pub handle: String,

    /// Optional full profile URL.
    pub url: String,

    /// Disabled links stay stored but are omitted from the shared script.
    pub enabled: bool,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

/// Input for creating or overwriting a social link.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialLinkInput {
    pub platform: String,
    pub handle: String,
    pub url: Option<String>,
    pub enabled: Option<bool>,
}

impl SocialLink {
    /// Create or overwrite the link for a platform.
    pub async fn upsert(conn: &mut SqliteConnection, input: SocialLinkInput) -> EngineResult<Self> {
        let platform = input.platform.trim().to_lowercase();
        if platform.is_empty() {
            return Err(EngineError::Validation(
                "platform must not be empty".to_string(),
            ));
        }

        let url = input.url.unwrap_or_default();
        let enabled = input.enabled.unwrap_or(true);
        let now = chrono::Utc::now().timestamp();

        let link = sqlx::query_as::<_, SocialLink>(
            r#"
            INSERT INTO social_media (platform, handle, url, enabled, changed)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(platform) DO UPDATE SET
                handle = excluded.handle,
                url = excluded.url,
                enabled = excluded.enabled,
                changed = excluded.changed
            RETURNING platform, handle, url, enabled, changed
            "#,
        )
        .bind(&platform)
        .bind(&input.handle)
        .bind(&url)
        .bind(enabled)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(link)
    }

    /// List all links, ordered by platform for determinism.
    pub async fn list(conn: &mut SqliteConnection) -> EngineResult<Vec<Self>> {
        let links = sqlx::query_as::<_, SocialLink>(
            "SELECT platform, handle, url, enabled, changed FROM social_media ORDER BY platform ASC",
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(links)
    }

    /// Platform → handle map of enabled links, as embedded in the shared
    /// script. BTreeMap keeps the serialized order stable.
    pub async fn handle_map(conn: &mut SqliteConnection) -> EngineResult<BTreeMap<String, String>> {
        let links = Self::list(&mut *conn).await?;

        Ok(links
            .into_iter()
            .filter(|l| l.enabled)
            .map(|l| (l.platform, l.handle))
            .collect())
    }
}
