//! Output paths and render contexts for page artifacts.
//!
//! Pages land at the output root as `{slug}.html`; articles live one
//! level down under the configured content directory, next to their
//! listing index. Slugs are validated at save time, so the joins here
//! cannot escape the output root.

use std::path::{Path, PathBuf};

use crate::models::{ArticleRecord, PageRecord};
use crate::theme::{ArticleSummary, AssetRefs, BakedValues, PageContext};

/// Location of the shared stylesheet under the output root.
pub const STYLESHEET_PATH: &str = "assets/css/custom-styles.css";

/// Location of the shared script under the output root.
pub const SCRIPT_PATH: &str = "assets/js/site-config.js";

pub fn stylesheet_path(output_dir: &Path) -> PathBuf {
    output_dir.join(STYLESHEET_PATH)
}

pub fn script_path(output_dir: &Path) -> PathBuf {
    output_dir.join(SCRIPT_PATH)
}

pub fn page_path(output_dir: &Path, slug: &str) -> PathBuf {
    output_dir.join(format!("{slug}.html"))
}

pub fn article_path(output_dir: &Path, content_dir: &str, slug: &str) -> PathBuf {
    output_dir.join(content_dir).join(format!("{slug}.html"))
}

pub fn articles_index_path(output_dir: &Path, content_dir: &str) -> PathBuf {
    output_dir.join(content_dir).join("index.html")
}

/// Context for a top-level page.
pub fn page_context(site_name: &str, page: &PageRecord) -> PageContext {
    PageContext {
        baked: BakedValues {
            site_name: site_name.to_string(),
            title: page.title.clone(),
            description: page.description.clone(),
            content: page.body.clone(),
        },
        assets: AssetRefs::at_depth(0),
        articles: Vec::new(),
    }
}

/// Context for an article page, one directory below the root.
pub fn article_context(site_name: &str, article: &ArticleRecord) -> PageContext {
    PageContext {
        baked: BakedValues {
            site_name: site_name.to_string(),
            title: article.title.clone(),
            description: article.excerpt.clone(),
            content: article.body.clone(),
        },
        assets: AssetRefs::at_depth(1),
        articles: Vec::new(),
    }
}

/// Context for the article listing index. `articles` must already be
/// filtered to published records, newest first.
pub fn articles_index_context(
    site_name: &str,
    description: &str,
    articles: &[ArticleRecord],
) -> PageContext {
    let summaries = articles
        .iter()
        .map(|a| ArticleSummary {
            slug: a.slug.clone(),
            title: a.title.clone(),
            excerpt: a.excerpt.clone(),
            category: a.category.clone(),
            author: a.author.clone(),
            href: format!("{}.html", a.slug),
            published: a.created,
        })
        .collect();

    PageContext {
        baked: BakedValues {
            site_name: site_name.to_string(),
            title: "Articles".to_string(),
            description: description.to_string(),
            content: String::new(),
        },
        assets: AssetRefs::at_depth(1),
        articles: summaries,
    }
}
