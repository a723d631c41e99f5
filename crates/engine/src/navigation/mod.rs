//! Navigation tree manager.
//!
//! CRUD, reorder, and cascade-delete logic over the navigation forest.
//! All operations take the caller's open connection (usually a
//! transaction) so a mutation and the artifact regeneration it triggers
//! see the same store state and commit together.
//!
//! Invariants maintained by every successful write:
//! - the parent relation is a forest — an item can never become its own
//!   ancestor;
//! - positions within a sibling group are dense and zero-based.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::navigation::{CreateNavigationItem, NavigationItem, UpdateNavigationItem};

/// What happens to the children of a deleted item.
///
/// There is deliberately no default: the caller chooses every time.
/// `CascadeDelete` is the documented recommendation for API surfaces
/// that need one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadePolicy {
    /// Remove the entire subtree.
    CascadeDelete,
    /// Re-attach children to the deleted item's parent, keeping their
    /// relative order and taking the deleted item's place.
    ReparentChildren,
}

/// A navigation item with its ordered children.
#[derive(Debug, Clone, Serialize)]
pub struct NavNode {
    #[serde(flatten)]
    pub item: NavigationItem,
    pub children: Vec<NavNode>,
}

/// Create a navigation item, appended to its sibling group unless a
/// position is given.
pub async fn create(
    conn: &mut SqliteConnection,
    input: CreateNavigationItem,
) -> EngineResult<NavigationItem> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(EngineError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    if input.target_url.trim().is_empty() {
        return Err(EngineError::Validation(
            "target_url must not be empty".to_string(),
        ));
    }

    if let Some(parent_id) = input.parent_id
        && NavigationItem::find_by_id(&mut *conn, parent_id)
            .await?
            .is_none()
    {
        return Err(EngineError::NotFound(format!(
            "parent navigation item {parent_id}"
        )));
    }

    let position = match input.position {
        Some(p) => p,
        None => NavigationItem::next_position(&mut *conn, input.parent_id).await?,
    };

    let item = NavigationItem::insert(
        &mut *conn,
        title,
        input.target_url.trim(),
        position,
        input.parent_id,
        input.is_active.unwrap_or(true),
        input.open_in_new_tab.unwrap_or(false),
        input.css_class.as_deref(),
    )
    .await?;

    normalize_positions(&mut *conn, item.parent_id).await?;

    // Re-read: normalization may have shifted the fresh row.
    let item = NavigationItem::find_by_id(&mut *conn, item.id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("navigation item {}", item.id)))?;

    Ok(item)
}

/// Update a navigation item. Moving it under a new parent is validated
/// against the no-cycle invariant first.
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    input: UpdateNavigationItem,
) -> EngineResult<NavigationItem> {
    let existing = NavigationItem::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("navigation item {id}")))?;

    let new_parent = input.parent_id.unwrap_or(existing.parent_id);
    let parent_changed = new_parent != existing.parent_id;

    if parent_changed && let Some(parent_id) = new_parent {
        ensure_not_descendant(&mut *conn, id, parent_id).await?;
    }

    let title = input.title.unwrap_or(existing.title);
    if title.trim().is_empty() {
        return Err(EngineError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    let target_url = input.target_url.unwrap_or(existing.target_url);
    if target_url.trim().is_empty() {
        return Err(EngineError::Validation(
            "target_url must not be empty".to_string(),
        ));
    }

    let position = match input.position {
        Some(p) => p,
        // Moving to a new sibling group without an explicit position
        // appends to the end of that group.
        None if parent_changed => NavigationItem::next_position(&mut *conn, new_parent).await?,
        None => existing.position,
    };

    let is_active = input.is_active.unwrap_or(existing.is_active);
    let open_in_new_tab = input.open_in_new_tab.unwrap_or(existing.open_in_new_tab);
    let css_class = input.css_class.unwrap_or(existing.css_class);

    let updated = NavigationItem::update_row(
        &mut *conn,
        id,
        title.trim(),
        target_url.trim(),
        position,
        new_parent,
        is_active,
        open_in_new_tab,
        css_class.as_deref(),
    )
    .await?
    .ok_or_else(|| EngineError::NotFound(format!("navigation item {id}")))?;

    normalize_positions(&mut *conn, new_parent).await?;
    if parent_changed {
        normalize_positions(&mut *conn, existing.parent_id).await?;
    }

    let updated = NavigationItem::find_by_id(&mut *conn, updated.id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("navigation item {id}")))?;

    Ok(updated)
}

/// Delete a navigation item under an explicit cascade policy.
///
/// Returns the number of items removed.
pub async fn delete(
    conn: &mut SqliteConnection,
    id: i64,
    policy: CascadePolicy,
) -> EngineResult<u64> {
    let target = NavigationItem::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("navigation item {id}")))?;

    let removed = match policy {
        CascadePolicy::CascadeDelete => {
            let subtree = collect_subtree(&mut *conn, id).await?;
            // Children before parents so the self-referential foreign key
            // never sees a dangling parent.
            for &node_id in subtree.iter().rev() {
                NavigationItem::delete_one(&mut *conn, node_id).await?;
            }
            subtree.len() as u64
        }
        CascadePolicy::ReparentChildren => {
            let children = NavigationItem::children_of(&mut *conn, Some(id)).await?;

            // Children take the deleted item's slot: splice them into the
            // parent's ordered list where the item used to be, then let
            // normalization assign dense positions.
            let siblings = NavigationItem::children_of(&mut *conn, target.parent_id).await?;
            let mut ordered: Vec<i64> = Vec::with_capacity(siblings.len() + children.len());
            for sibling in &siblings {
                if sibling.id == id {
                    ordered.extend(children.iter().map(|c| c.id));
                } else {
                    ordered.push(sibling.id);
                }
            }

            for child in &children {
                NavigationItem::set_parent_and_position(
                    &mut *conn,
                    child.id,
                    target.parent_id,
                    child.position,
                )
                .await?;
            }
            NavigationItem::delete_one(&mut *conn, id).await?;

            for (position, &node_id) in ordered.iter().enumerate() {
                NavigationItem::set_position(&mut *conn, node_id, position as i64).await?;
            }
            1
        }
    };

    normalize_positions(&mut *conn, target.parent_id).await?;
    debug!(id, ?policy, removed, "deleted navigation item");

    Ok(removed)
}

/// Reorder a sibling group.
///
/// `ordered` must list every current member of the group exactly once;
/// the new positions are applied as a single batch so a partial reorder
/// is never observable.
pub async fn reorder(
    conn: &mut SqliteConnection,
    parent_id: Option<i64>,
    ordered: &[i64],
) -> EngineResult<()> {
    let siblings = NavigationItem::children_of(&mut *conn, parent_id).await?;
    let group: HashSet<i64> = siblings.iter().map(|s| s.id).collect();

    if ordered.len() != group.len() {
        return Err(EngineError::Validation(format!(
            "reorder must list all {} siblings, got {}",
            group.len(),
            ordered.len()
        )));
    }

    let mut seen = HashSet::new();
    for &item_id in ordered {
        if !group.contains(&item_id) {
            if NavigationItem::find_by_id(&mut *conn, item_id)
                .await?
                .is_none()
            {
                return Err(EngineError::NotFound(format!("navigation item {item_id}")));
            }
            return Err(EngineError::Validation(format!(
                "navigation item {item_id} is not in this sibling group"
            )));
        }
        if !seen.insert(item_id) {
            return Err(EngineError::Validation(format!(
                "navigation item {item_id} listed twice"
            )));
        }
    }

    for (position, &item_id) in ordered.iter().enumerate() {
        NavigationItem::set_position(&mut *conn, item_id, position as i64).await?;
    }

    Ok(())
}

/// Build the navigation forest, ordered by position at every level.
///
/// With `active_only`, inactive items are pruned together with their
/// entire subtrees — an active child of an inactive parent is not
/// reachable in the published site.
pub async fn forest(conn: &mut SqliteConnection, active_only: bool) -> EngineResult<Vec<NavNode>> {
    let items = NavigationItem::list_all(&mut *conn).await?;
    Ok(build_forest(items, active_only))
}

/// Reject attaching `id` under `candidate_parent` when that would create
/// a cycle. Explicit iterative walk up the ancestor chain; a visited set
/// guards against walking a corrupted (already cyclic) store forever.
async fn ensure_not_descendant(
    conn: &mut SqliteConnection,
    id: i64,
    candidate_parent: i64,
) -> EngineResult<()> {
    if candidate_parent == id {
        return Err(EngineError::Conflict(format!(
            "navigation item {id} cannot be its own parent"
        )));
    }

    let mut visited = HashSet::new();
    let mut cursor = Some(candidate_parent);

    while let Some(current) = cursor {
        if current == id {
            return Err(EngineError::Conflict(format!(
                "navigation item {candidate_parent} is a descendant of {id}"
            )));
        }
        if !visited.insert(current) {
            break;
        }
        let node = NavigationItem::find_by_id(&mut *conn, current)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("navigation item {current}")))?;
        cursor = node.parent_id;
    }

    Ok(())
}

/// Collect a subtree in breadth-first order using an explicit queue.
async fn collect_subtree(conn: &mut SqliteConnection, root: i64) -> EngineResult<Vec<i64>> {
    let mut collected = Vec::new();
    let mut queue = VecDeque::from([root]);
    let mut visited = HashSet::new();

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        collected.push(current);
        for child in NavigationItem::children_of(&mut *conn, Some(current)).await? {
            queue.push_back(child.id);
        }
    }

    Ok(collected)
}

/// Rewrite a sibling group's positions to a dense 0..n sequence,
/// preserving the current (position, id) order.
async fn normalize_positions(
    conn: &mut SqliteConnection,
    parent_id: Option<i64>,
) -> EngineResult<()> {
    let siblings = NavigationItem::children_of(&mut *conn, parent_id).await?;

    for (position, sibling) in siblings.iter().enumerate() {
        let position = position as i64;
        if sibling.position != position {
            NavigationItem::set_position(&mut *conn, sibling.id, position).await?;
        }
    }

    Ok(())
}

/// Assemble nodes into a forest without recursion: leaves first, each
/// node attached to its parent once all of its own children are in
/// place.
fn build_forest(items: Vec<NavigationItem>, active_only: bool) -> Vec<NavNode> {
    let items = if active_only {
        prune_inactive(items)
    } else {
        items
    };

    let mut child_counts: HashMap<i64, usize> = HashMap::new();
    let known: HashSet<i64> = items.iter().map(|i| i.id).collect();
    for item in &items {
        if let Some(parent) = item.parent_id
            && known.contains(&parent)
        {
            *child_counts.entry(parent).or_insert(0) += 1;
        }
    }

    let mut nodes: HashMap<i64, NavNode> = HashMap::new();
    let mut ready: VecDeque<i64> = VecDeque::new();
    for item in items {
        let id = item.id;
        if child_counts.get(&id).copied().unwrap_or(0) == 0 {
            ready.push_back(id);
        }
        nodes.insert(
            id,
            NavNode {
                item,
                children: Vec::new(),
            },
        );
    }

    let mut roots = Vec::new();
    while let Some(id) = ready.pop_front() {
        let Some(mut node) = nodes.remove(&id) else {
            continue;
        };
        node.children
            .sort_by_key(|c| (c.item.position, c.item.id));

        match node.item.parent_id {
            Some(parent) if nodes.contains_key(&parent) => {
                if let Some(parent_node) = nodes.get_mut(&parent) {
                    parent_node.children.push(node);
                }
                if let Some(count) = child_counts.get_mut(&parent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push_back(parent);
                    }
                }
            }
            _ => roots.push(node),
        }
    }

    roots.sort_by_key(|n| (n.item.position, n.item.id));
    roots
}

/// Drop inactive items and everything beneath them.
fn prune_inactive(items: Vec<NavigationItem>) -> Vec<NavigationItem> {
    let mut removed: HashSet<i64> = items.iter().filter(|i| !i.is_active).map(|i| i.id).collect();

    // Children of removed nodes are unreachable too; sweep until stable.
    loop {
        let before = removed.len();
        for item in &items {
            if let Some(parent) = item.parent_id
                && removed.contains(&parent)
            {
                removed.insert(item.id);
            }
        }
        if removed.len() == before {
            break;
        }
    }

    items
        .into_iter()
        .filter(|i| !removed.contains(&i.id))
        .collect()
}
