//! Branding singleton — the site's palette, typography, and custom CSS.
//!
//! Stored as a single row (`id = 1`) with a version counter. The row may
//! be absent, in which case reads return the default palette; absence is
//! never an error. Writers read-then-write inside one transaction and can
//! pass the version they read to detect lost updates.

use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::error::{EngineError, EngineResult};

/// Default brand palette.
pub const DEFAULT_PRIMARY: &str = "#1b5fa3";
pub const DEFAULT_SECONDARY: &str = "#144a84";
pub const DEFAULT_ACCENT: &str = "#f9943b";
pub const DEFAULT_DARK: &str = "#1F2937";
pub const DEFAULT_LIGHT: &str = "#F3F4F6";
pub const DEFAULT_FONT: &str = "Inter";

/// Branding configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Branding {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub dark_color: String,
    pub light_color: String,
    pub font_family: String,
    pub custom_css: String,

    /// Incremented on every successful write; 0 while the row is absent.
    pub version: i64,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY.to_string(),
            secondary_color: DEFAULT_SECONDARY.to_string(),
            accent_color: DEFAULT_ACCENT.to_string(),
            dark_color: DEFAULT_DARK.to_string(),
            light_color: DEFAULT_LIGHT.to_string(),
            font_family: DEFAULT_FONT.to_string(),
            custom_css: String::new(),
            version: 0,
        }
    }
}

/// Input for updating branding. Unset fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandingUpdate {
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub accent_color: Option<String>,
    pub dark_color: Option<String>,
    pub light_color: Option<String>,
    pub font_family: Option<String>,
    pub custom_css: Option<String>,
}

impl Branding {
    /// Read the singleton, substituting defaults when the row is absent.
    pub async fn get(conn: &mut SqliteConnection) -> EngineResult<Self> {
        let row = sqlx::query_as::<_, Branding>(
            r#"
            SELECT primary_color, secondary_color, accent_color, dark_color, light_color,
                   font_family, custom_css, version
            FROM branding WHERE id = 1
            "#,
        )
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.unwrap_or_default())
    }

    /// Replace the singleton.
    ///
    /// Reads the current row, merges `update` over it, and writes the
    /// result with an incremented version — all inside the caller's
    /// transaction. When `expected_version` is given and the stored
    /// version has moved on, the write is rejected with a conflict
    /// instead of silently dropping the concurrent edit.
    pub async fn update(
        conn: &mut SqliteConnection,
        update: BrandingUpdate,
        expected_version: Option<i64>,
    ) -> EngineResult<Self> {
        let current = Self::get(&mut *conn).await?;

        if let Some(expected) = expected_version
            && expected != current.version
        {
            return Err(EngineError::Conflict(format!(
                "branding version {} is stale (current {})",
                expected, current.version
            )));
        }

        let merged = Branding {
            primary_color: update.primary_color.unwrap_or(current.primary_color),
            secondary_color: update.secondary_color.unwrap_or(current.secondary_color),
            accent_color: update.accent_color.unwrap_or(current.accent_color),
            dark_color: update.dark_color.unwrap_or(current.dark_color),
            light_color: update.light_color.unwrap_or(current.light_color),
            font_family: update.font_family.unwrap_or(current.font_family),
            custom_css: update.custom_css.unwrap_or(current.custom_css),
            version: current.version + 1,
        };

        for (name, value) in [
            ("primary_color", &merged.primary_color),
            ("secondary_color", &merged.secondary_color),
            ("accent_color", &merged.accent_color),
            ("dark_color", &merged.dark_color),
            ("light_color", &merged.light_color),
        ] {
            if !is_hex_color(value) {
                return Err(EngineError::Validation(format!(
                    "{name} must be a hex color, got '{value}'"
                )));
            }
        }

        if merged.font_family.trim().is_empty() {
            return Err(EngineError::Validation(
                "font_family must not be empty".to_string(),
            ));
        }

        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO branding
                (id, primary_color, secondary_color, accent_color, dark_color, light_color,
                 font_family, custom_css, version, changed)
            VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                primary_color = excluded.primary_color,
                secondary_color = excluded.secondary_color,
                accent_color = excluded.accent_color,
                dark_color = excluded.dark_color,
                light_color = excluded.light_color,
                font_family = excluded.font_family,
                custom_css = excluded.custom_css,
                version = excluded.version,
                changed = excluded.changed
            "#,
        )
        .bind(&merged.primary_color)
        .bind(&merged.secondary_color)
        .bind(&merged.accent_color)
        .bind(&merged.dark_color)
        .bind(&merged.light_color)
        .bind(&merged.font_family)
        .bind(&merged.custom_css)
        .bind(merged.version)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(merged)
    }
}

/// Accept `#rgb` and `#rrggbb`.
fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}
