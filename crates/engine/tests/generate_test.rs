#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Artifact generation tests: determinism, minimal regeneration, and
//! the all-or-nothing guarantee when generation fails mid-mutation.

mod common;

use std::fs;

use common::TestSite;
use sitesmith_engine::models::{SavePage, SocialLinkInput};
use sitesmith_engine::EngineError;

fn social(platform: &str, handle: &str) -> SocialLinkInput {
    SocialLinkInput {
        platform: platform.to_string(),
        handle: handle.to_string(),
        url: None,
        enabled: None,
    }
}

fn page(slug: &str, template: &str) -> SavePage {
    SavePage {
        slug: slug.to_string(),
        title: "Title".to_string(),
        body: Some("<p>body</p>".to_string()),
        template: Some(template.to_string()),
        description: None,
        status: Some(sitesmith_engine::models::ContentStatus::Published),
    }
}

#[tokio::test]
async fn test_rebuild_is_byte_identical() {
    let site = TestSite::new().await;
    site.engine.save_page(page("about", "page")).await.unwrap();
    site.engine.upsert_social(social("github", "acme")).await.unwrap();

    site.engine.rebuild_all().await.unwrap();
    let css1 = site.stylesheet();
    let js1 = site.script();
    let page1 = site.page("about");

    site.engine.rebuild_all().await.unwrap();
    assert_eq!(site.stylesheet(), css1);
    assert_eq!(site.script(), js1);
    assert_eq!(site.page("about"), page1);
}

#[tokio::test]
async fn test_social_update_changes_script_not_stylesheet() {
    let site = TestSite::new().await;
    site.engine.rebuild_all().await.unwrap();
    let css_before = site.stylesheet();

    site.engine.upsert_social(social("twitter", "@acme")).await.unwrap();

    assert!(site.script().contains(r#""twitter": "@acme""#));
    assert_eq!(site.stylesheet(), css_before);
}

#[tokio::test]
async fn test_disabled_social_link_drops_out_of_script() {
    let site = TestSite::new().await;
    site.engine.upsert_social(social("github", "acme")).await.unwrap();
    assert!(site.script().contains(r#""github""#));

    site.engine
        .upsert_social(SocialLinkInput {
            platform: "github".to_string(),
            handle: "acme".to_string(),
            url: None,
            enabled: Some(false),
        })
        .await
        .unwrap();
    assert!(!site.script().contains(r#""github""#));
}

#[tokio::test]
async fn test_render_failure_rolls_back_the_store() {
    let site =
        TestSite::with_templates(&sitesmith_test_utils::theme_with_broken_template()).await;

    // Publish a good page first so an artifact exists.
    site.engine.save_page(page("about", "page")).await.unwrap();
    let before = site.page("about");

    let err = site
        .engine
        .save_page(page("about", "broken"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Render { .. }), "{err}");

    // Store still holds the old record, output the old bytes.
    let stored = site.engine.get_page("about").await.unwrap().unwrap();
    assert_eq!(stored.template, "page");
    assert_eq!(site.page("about"), before);
    assert!(site.temp_files().is_empty());
}

#[tokio::test]
async fn test_missing_template_is_a_render_error() {
    let site = TestSite::new().await;
    let err = site
        .engine
        .save_page(page("about", "no-such-template"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Render { .. }), "{err}");
    assert!(site.engine.get_page("about").await.unwrap().is_none());
}

#[tokio::test]
async fn test_write_failure_rolls_back_the_store() {
    let site = TestSite::new().await;

    // Block the page's destination with a directory so the final
    // rename cannot succeed.
    let dest = site.artifact_path("about.html");
    fs::create_dir_all(&dest).unwrap();

    let err = site.engine.save_page(page("about", "page")).await.unwrap_err();
    assert!(matches!(err, EngineError::Write { .. }), "{err}");

    assert!(site.engine.get_page("about").await.unwrap().is_none());
    assert!(site.temp_files().is_empty());
}

#[tokio::test]
async fn test_unknown_setting_touches_no_artifact() {
    let site = TestSite::new().await;
    site.engine
        .set_setting("analytics_id", serde_json::json!("UA-1"))
        .await
        .unwrap();

    assert!(!site.has_artifact("assets/js/site-config.js"));
    assert!(!site.has_artifact("assets/css/custom-styles.css"));
    assert_eq!(
        site.engine.setting("analytics_id").await.unwrap(),
        Some(serde_json::json!("UA-1"))
    );
}

#[tokio::test]
async fn test_site_name_reaches_script_and_baked_pages() {
    let site = TestSite::new().await;
    site.engine.save_page(page("about", "page")).await.unwrap();

    site.engine
        .set_setting("site_name", serde_json::json!("Acme Widgets"))
        .await
        .unwrap();

    assert!(site.script().contains(r#"siteName: "Acme Widgets""#));
    assert!(site.page("about").contains("Acme Widgets"));
}

#[tokio::test]
async fn test_site_url_changes_script_only() {
    let site = TestSite::new().await;
    site.engine.save_page(page("about", "page")).await.unwrap();
    let page_before = site.page("about");

    site.engine
        .set_setting("site_url", serde_json::json!("https://acme.example"))
        .await
        .unwrap();

    assert!(site.script().contains(r#"siteUrl: "https://acme.example""#));
    assert_eq!(site.page("about"), page_before);
}
