#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Branding tests: defaults, stylesheet regeneration, and the version
//! counter guarding concurrent edits.

mod common;

use common::TestSite;
use sitesmith_engine::models::{branding, Branding, BrandingUpdate};
use sitesmith_engine::EngineError;

#[tokio::test]
async fn test_missing_row_reads_as_defaults() {
    let site = TestSite::new().await;
    let current = site.engine.branding().await.unwrap();
    assert_eq!(current, Branding::default());
    assert_eq!(current.primary_color, branding::DEFAULT_PRIMARY);
    assert_eq!(current.version, 0);
}

#[tokio::test]
async fn test_update_regenerates_the_stylesheet() {
    let site = TestSite::new().await;
    site.engine
        .update_branding(
            BrandingUpdate {
                primary_color: Some("#123456".into()),
                ..BrandingUpdate::default()
            },
            None,
        )
        .await
        .unwrap();

    let css = site.stylesheet();
    assert!(css.contains("--brand-primary: #123456;"));
    // Unset fields keep their defaults.
    assert!(css.contains(&format!("--brand-accent: {};", branding::DEFAULT_ACCENT)));
    // Branding never touches the script.
    assert!(!site.has_artifact("assets/js/site-config.js"));
}

#[tokio::test]
async fn test_version_increments_per_write() {
    let site = TestSite::new().await;
    let first = site
        .engine
        .update_branding(
            BrandingUpdate {
                font_family: Some("Lato".into()),
                ..BrandingUpdate::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(first.version, 1);

    let second = site
        .engine
        .update_branding(
            BrandingUpdate {
                font_family: Some("Roboto".into()),
                ..BrandingUpdate::default()
            },
            Some(first.version),
        )
        .await
        .unwrap();
    assert_eq!(second.version, 2);
}

#[tokio::test]
async fn test_stale_version_is_a_conflict() {
    let site = TestSite::new().await;
    let current = site
        .engine
        .update_branding(
            BrandingUpdate {
                primary_color: Some("#222222".into()),
                ..BrandingUpdate::default()
            },
            None,
        )
        .await
        .unwrap();

    let err = site
        .engine
        .update_branding(
            BrandingUpdate {
                primary_color: Some("#333333".into()),
                ..BrandingUpdate::default()
            },
            Some(current.version - 1),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)), "{err}");

    // The losing write left nothing behind.
    let css = site.stylesheet();
    assert!(css.contains("--brand-primary: #222222;"));
}

#[tokio::test]
async fn test_invalid_color_is_rejected_before_any_write() {
    let site = TestSite::new().await;
    let err = site
        .engine
        .update_branding(
            BrandingUpdate {
                primary_color: Some("crimson".into()),
                ..BrandingUpdate::default()
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err}");

    assert_eq!(site.engine.branding().await.unwrap().version, 0);
    assert!(!site.has_artifact("assets/css/custom-styles.css"));
}

#[tokio::test]
async fn test_concurrent_updates_serialize_one_config_wins() {
    let site = TestSite::new().await;
    let red = BrandingUpdate {
        primary_color: Some("#aa0000".into()),
        secondary_color: Some("#770000".into()),
        ..BrandingUpdate::default()
    };
    let blue = BrandingUpdate {
        primary_color: Some("#0000aa".into()),
        secondary_color: Some("#000077".into()),
        ..BrandingUpdate::default()
    };

    let engine_a = site.engine.clone();
    let engine_b = site.engine.clone();
    let (a, b) = tokio::join!(
        engine_a.update_branding(red, None),
        engine_b.update_branding(blue, None),
    );
    a.unwrap();
    b.unwrap();

    // Whichever write landed last, the stylesheet reflects it whole.
    let css = site.stylesheet();
    let red_won =
        css.contains("--brand-primary: #aa0000;") && css.contains("--brand-secondary: #770000;");
    let blue_won =
        css.contains("--brand-primary: #0000aa;") && css.contains("--brand-secondary: #000077;");
    assert!(red_won ^ blue_won, "mixed palettes in output:\n{css}");

    assert_eq!(site.engine.branding().await.unwrap().version, 2);
    assert!(site.temp_files().is_empty());
}
