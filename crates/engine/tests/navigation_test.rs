#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Navigation tree tests: ordering, cycle rejection, cascade policies,
//! and the shared script staying in sync.

mod common;

use common::TestSite;
use sitesmith_engine::models::{CreateNavigationItem, UpdateNavigationItem};
use sitesmith_engine::navigation::CascadePolicy;
use sitesmith_engine::EngineError;

fn item(title: &str, url: &str, parent_id: Option<i64>) -> CreateNavigationItem {
    CreateNavigationItem {
        title: title.to_string(),
        target_url: url.to_string(),
        parent_id,
        position: None,
        is_active: None,
        open_in_new_tab: None,
        css_class: None,
    }
}

#[tokio::test]
async fn test_items_append_in_creation_order() {
    let site = TestSite::new().await;
    let home = site.engine.create_navigation(item("Home", "index.html", None)).await.unwrap();
    let about = site.engine.create_navigation(item("About", "about.html", None)).await.unwrap();

    assert_eq!(home.position, 0);
    assert_eq!(about.position, 1);

    let tree = site.engine.navigation_tree(false).await.unwrap();
    let titles: Vec<_> = tree.iter().map(|n| n.item.title.as_str()).collect();
    assert_eq!(titles, ["Home", "About"]);
}

#[tokio::test]
async fn test_mutation_regenerates_the_script() {
    let site = TestSite::new().await;
    site.engine.create_navigation(item("Docs", "docs.html", None)).await.unwrap();

    let js = site.script();
    assert!(js.contains(r#""title": "Docs""#));
    assert!(js.contains(r#""url": "docs.html""#));
    // Navigation never touches the stylesheet.
    assert!(!site.has_artifact("assets/css/custom-styles.css"));
}

#[tokio::test]
async fn test_reparent_under_own_descendant_is_a_conflict() {
    let site = TestSite::new().await;
    let a = site.engine.create_navigation(item("A", "a.html", None)).await.unwrap();
    let b = site.engine.create_navigation(item("B", "b.html", Some(a.id))).await.unwrap();
    let c = site.engine.create_navigation(item("C", "c.html", Some(b.id))).await.unwrap();

    let err = site
        .engine
        .update_navigation(
            a.id,
            UpdateNavigationItem {
                parent_id: Some(Some(c.id)),
                ..UpdateNavigationItem::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)), "{err}");

    // Self-parenting is the degenerate cycle.
    let err = site
        .engine
        .update_navigation(
            a.id,
            UpdateNavigationItem {
                parent_id: Some(Some(a.id)),
                ..UpdateNavigationItem::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)), "{err}");
}

#[tokio::test]
async fn test_cascade_delete_removes_the_whole_subtree() {
    let site = TestSite::new().await;
    let a = site.engine.create_navigation(item("A", "a.html", None)).await.unwrap();
    let b = site.engine.create_navigation(item("B", "b.html", Some(a.id))).await.unwrap();
    site.engine.create_navigation(item("C", "c.html", Some(b.id))).await.unwrap();
    site.engine.create_navigation(item("D", "d.html", None)).await.unwrap();

    let removed = site
        .engine
        .delete_navigation(a.id, CascadePolicy::CascadeDelete)
        .await
        .unwrap();
    assert_eq!(removed, 3);

    let tree = site.engine.navigation_tree(false).await.unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].item.title, "D");
    assert_eq!(tree[0].item.position, 0);
}

#[tokio::test]
async fn test_reparent_children_splices_into_deleted_slot() {
    let site = TestSite::new().await;
    let before = site.engine.create_navigation(item("Before", "x.html", None)).await.unwrap();
    let parent = site.engine.create_navigation(item("Parent", "p.html", None)).await.unwrap();
    let after = site.engine.create_navigation(item("After", "y.html", None)).await.unwrap();
    let kid1 = site.engine.create_navigation(item("Kid1", "k1.html", Some(parent.id))).await.unwrap();
    let kid2 = site.engine.create_navigation(item("Kid2", "k2.html", Some(parent.id))).await.unwrap();

    let removed = site
        .engine
        .delete_navigation(parent.id, CascadePolicy::ReparentChildren)
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let tree = site.engine.navigation_tree(false).await.unwrap();
    let ids: Vec<_> = tree.iter().map(|n| n.item.id).collect();
    assert_eq!(ids, [before.id, kid1.id, kid2.id, after.id]);
    let positions: Vec<_> = tree.iter().map(|n| n.item.position).collect();
    assert_eq!(positions, [0, 1, 2, 3]);
}

#[tokio::test]
async fn test_reorder_applies_exactly() {
    let site = TestSite::new().await;
    let a = site.engine.create_navigation(item("A", "a.html", None)).await.unwrap();
    let b = site.engine.create_navigation(item("B", "b.html", None)).await.unwrap();
    let c = site.engine.create_navigation(item("C", "c.html", None)).await.unwrap();

    site.engine.reorder_navigation(None, &[c.id, a.id, b.id]).await.unwrap();

    let tree = site.engine.navigation_tree(false).await.unwrap();
    let titles: Vec<_> = tree.iter().map(|n| n.item.title.as_str()).collect();
    assert_eq!(titles, ["C", "A", "B"]);

    // The script's array order matches.
    let js = site.script();
    let pos_a = js.find(r#""title": "A""#).unwrap();
    let pos_b = js.find(r#""title": "B""#).unwrap();
    let pos_c = js.find(r#""title": "C""#).unwrap();
    assert!(pos_c < pos_a && pos_a < pos_b);
}

#[tokio::test]
async fn test_reorder_must_name_every_sibling_exactly_once() {
    let site = TestSite::new().await;
    let a = site.engine.create_navigation(item("A", "a.html", None)).await.unwrap();
    let b = site.engine.create_navigation(item("B", "b.html", None)).await.unwrap();

    // Incomplete.
    let err = site.engine.reorder_navigation(None, &[a.id]).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err}");

    // Duplicate.
    let err = site
        .engine
        .reorder_navigation(None, &[a.id, a.id, b.id])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err}");

    // Foreign id.
    let err = site
        .engine
        .reorder_navigation(None, &[a.id, 9999])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)), "{err}");

    // Order unchanged after the failures.
    let tree = site.engine.navigation_tree(false).await.unwrap();
    let ids: Vec<_> = tree.iter().map(|n| n.item.id).collect();
    assert_eq!(ids, [a.id, b.id]);
}

#[tokio::test]
async fn test_inactive_items_are_left_out_of_the_script() {
    let site = TestSite::new().await;
    site.engine.create_navigation(item("Shown", "a.html", None)).await.unwrap();
    let hidden = site.engine.create_navigation(item("Hidden", "b.html", None)).await.unwrap();

    site.engine
        .update_navigation(
            hidden.id,
            UpdateNavigationItem {
                is_active: Some(false),
                ..UpdateNavigationItem::default()
            },
        )
        .await
        .unwrap();

    let js = site.script();
    assert!(js.contains(r#""title": "Shown""#));
    assert!(!js.contains(r#""title": "Hidden""#));

    // Still present in the store and in the full tree.
    let tree = site.engine.navigation_tree(false).await.unwrap();
    assert_eq!(tree.len(), 2);
    let active = site.engine.navigation_tree(true).await.unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn test_unknown_parent_is_rejected() {
    let site = TestSite::new().await;
    let err = site
        .engine
        .create_navigation(item("Lost", "x.html", Some(404)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)), "{err}");
}
