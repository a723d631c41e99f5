//! Navigation item rows — the persisted half of the navigation forest.
//!
//! Row-level reads and writes only; forest invariants (no cycles, dense
//! sibling positions, cascade policies) are enforced by the
//! [`crate::navigation`] manager, which drives these queries inside a
//! single transaction per mutation.

use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::error::EngineResult;

/// Navigation item record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NavigationItem {
    /// Row id.
    pub id: i64,

    /// Display title.
    pub title: String,

    /// Link destination.
    pub target_url: String,

    /// Sibling-local ordering (dense, zero-based after every write).
    pub position: i64,

    /// Optional parent item; `None` for top-level items.
    pub parent_id: Option<i64>,

    /// Inactive items stay in the tree but are omitted from the shared
    /// script.
    pub is_active: bool,

    /// Whether the link opens in a new tab.
    pub open_in_new_tab: bool,

    /// Optional extra CSS class emitted into the shared script.
    pub css_class: Option<String>,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

/// Input for creating a navigation item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNavigationItem {
    pub title: String,
    pub target_url: String,
    pub parent_id: Option<i64>,
    /// When unset the item is appended to the end of its sibling group.
    pub position: Option<i64>,
    pub is_active: Option<bool>,
    pub open_in_new_tab: Option<bool>,
    pub css_class: Option<String>,
}

/// Input for updating a navigation item. Unset fields are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNavigationItem {
    pub title: Option<String>,
    pub target_url: Option<String>,
    /// `Some(None)` moves the item to the top level.
    pub parent_id: Option<Option<i64>>,
    pub position: Option<i64>,
    pub is_active: Option<bool>,
    pub open_in_new_tab: Option<bool>,
    pub css_class: Option<Option<String>>,
}

impl NavigationItem {
    /// Insert a fully resolved row.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        conn: &mut SqliteConnection,
        title: &str,
        target_url: &str,
        position: i64,
        parent_id: Option<i64>,
        is_active: bool,
        open_in_new_tab: bool,
        css_class: Option<&str>,
    ) -> EngineResult<Self> {
        let now = chrono::Utc::now().timestamp();

        let item = sqlx::query_as::<_, NavigationItem>(
            r#"
            INSERT INTO navigation
                (title, target_url, position, parent_id, is_active, open_in_new_tab, css_class, created, changed)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, target_url, position, parent_id, is_active, open_in_new_tab, css_class, created, changed
            "#,
        )
        .bind(title)
        .bind(target_url)
        .bind(position)
        .bind(parent_id)
        .bind(is_active)
        .bind(open_in_new_tab)
        .bind(css_class)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(item)
    }

    /// Find a navigation item by id.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> EngineResult<Option<Self>> {
        let item = sqlx::query_as::<_, NavigationItem>(
            "SELECT id, title, target_url, position, parent_id, is_active, open_in_new_tab, css_class, created, changed FROM navigation WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(item)
    }

    /// List every navigation item ordered by (position, id).
    ///
    /// Position ties can only exist transiently inside a mutation; the id
    /// tiebreak keeps reads deterministic regardless.
    pub async fn list_all(conn: &mut SqliteConnection) -> EngineResult<Vec<Self>> {
        let items = sqlx::query_as::<_, NavigationItem>(
            "SELECT id, title, target_url, position, parent_id, is_active, open_in_new_tab, css_class, created, changed FROM navigation ORDER BY position ASC, id ASC",
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }

    /// List the ordered children of a parent (`None` for top level).
    pub async fn children_of(
        conn: &mut SqliteConnection,
        parent_id: Option<i64>,
    ) -> EngineResult<Vec<Self>> {
        let items = sqlx::query_as::<_, NavigationItem>(
            "SELECT id, title, target_url, position, parent_id, is_active, open_in_new_tab, css_class, created, changed FROM navigation WHERE parent_id IS ? ORDER BY position ASC, id ASC",
        )
        .bind(parent_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }

    /// Overwrite all mutable fields of a row.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_row(
        conn: &mut SqliteConnection,
        id: i64,
        title: &str,
        target_url: &str,
        position: i64,
        parent_id: Option<i64>,
        is_active: bool,
        open_in_new_tab: bool,
        css_class: Option<&str>,
    ) -> EngineResult<Option<Self>> {
        let now = chrono::Utc::now().timestamp();

        let item = sqlx::query_as::<_, NavigationItem>(
            r#"
            UPDATE navigation
            SET title = ?, target_url = ?, position = ?, parent_id = ?,
                is_active = ?, open_in_new_tab = ?, css_class = ?, changed = ?
            WHERE id = ?
            RETURNING id, title, target_url, position, parent_id, is_active, open_in_new_tab, css_class, created, changed
            "#,
        )
        .bind(title)
        .bind(target_url)
        .bind(position)
        .bind(parent_id)
        .bind(is_active)
        .bind(open_in_new_tab)
        .bind(css_class)
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(item)
    }

    /// Set only the position of a row.
    pub async fn set_position(
        conn: &mut SqliteConnection,
        id: i64,
        position: i64,
    ) -> EngineResult<()> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query("UPDATE navigation SET position = ?, changed = ? WHERE id = ?")
            .bind(position)
            .bind(now)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Re-attach a row to a new parent at the given position.
    pub async fn set_parent_and_position(
        conn: &mut SqliteConnection,
        id: i64,
        parent_id: Option<i64>,
        position: i64,
    ) -> EngineResult<()> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query("UPDATE navigation SET parent_id = ?, position = ?, changed = ? WHERE id = ?")
            .bind(parent_id)
            .bind(position)
            .bind(now)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Delete a single row.
    pub async fn delete_one(conn: &mut SqliteConnection, id: i64) -> EngineResult<bool> {
        let result = sqlx::query("DELETE FROM navigation WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Next free position at the end of a sibling group.
    pub async fn next_position(
        conn: &mut SqliteConnection,
        parent_id: Option<i64>,
    ) -> EngineResult<i64> {
        let max: Option<i64> =
            sqlx::query_scalar("SELECT MAX(position) FROM navigation WHERE parent_id IS ?")
                .bind(parent_id)
                .fetch_one(&mut *conn)
                .await?;

        Ok(max.map_or(0, |m| m + 1))
    }
}
