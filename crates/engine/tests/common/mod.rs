#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test infrastructure.
//!
//! Each test gets its own temp directory holding the sqlite database
//! and the output folder, so tests never share state and the binary
//! can run them in parallel.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use sitesmith_engine::theme::ThemeEngine;
use sitesmith_engine::{Config, SiteEngine};

pub struct TestSite {
    pub engine: SiteEngine,
    pub output: PathBuf,
    // Dropping the tempdir removes the database and output tree.
    _dir: tempfile::TempDir,
}

impl TestSite {
    /// Engine with the default theme.
    pub async fn new() -> Self {
        Self::with_templates(&sitesmith_test_utils::default_theme()).await
    }

    /// Engine with caller-supplied raw templates.
    pub async fn with_templates(templates: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("site");
        let config = Config {
            database_url: format!("sqlite://{}", dir.path().join("site.db").display()),
            output_dir: output.clone(),
            templates_dir: dir.path().join("templates"),
            content_dir: "articles".to_string(),
        };
        let theme = ThemeEngine::from_raw_templates(templates).expect("theme");
        let engine = SiteEngine::with_theme(&config, theme).await.expect("engine");
        Self {
            engine,
            output,
            _dir: dir,
        }
    }

    pub fn artifact_path(&self, rel: &str) -> PathBuf {
        self.output.join(rel)
    }

    pub fn has_artifact(&self, rel: &str) -> bool {
        self.artifact_path(rel).exists()
    }

    pub fn artifact(&self, rel: &str) -> String {
        let path = self.artifact_path(rel);
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
    }

    pub fn stylesheet(&self) -> String {
        self.artifact("assets/css/custom-styles.css")
    }

    pub fn script(&self) -> String {
        self.artifact("assets/js/site-config.js")
    }

    pub fn page(&self, slug: &str) -> String {
        self.artifact(&format!("{slug}.html"))
    }

    pub fn article(&self, slug: &str) -> String {
        self.artifact(&format!("articles/{slug}.html"))
    }

    pub fn articles_index(&self) -> String {
        self.artifact("articles/index.html")
    }

    /// Leftover staging files under the output tree. Always empty after
    /// a mutation returns, success or failure.
    pub fn temp_files(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        collect_temp_files(&self.output, &mut found);
        found
    }
}

fn collect_temp_files(dir: &Path, found: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_temp_files(&path, found);
        } else if path.extension().is_some_and(|e| e == "tmp") {
            found.push(path);
        }
    }
}
