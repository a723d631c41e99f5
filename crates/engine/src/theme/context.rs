//! Typed render contexts.
//!
//! Two placeholder classes exist and must never be confused:
//!
//! - [`BakedValues`] are resolved against store state at generation time
//!   and embedded literally into the emitted HTML. Changing their source
//!   invalidates every page whose template uses them.
//! - [`AssetRefs`] are emitted as static references to the shared
//!   stylesheet/script; changing the underlying config only regenerates
//!   the shared artifact, and referencing pages stay untouched.
//!
//! Keeping them as separate types means a template context cannot bake a
//! reference-time value (or vice versa) by accident.

use serde::Serialize;

/// A bake-time placeholder a template may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BakeKey {
    SiteName,
    Title,
    Description,
    Content,
}

/// Values resolved at generation time and embedded into the page.
#[derive(Debug, Clone, Serialize)]
pub struct BakedValues {
    pub site_name: String,
    pub title: String,
    pub description: String,
    pub content: String,
}

/// References to the shared artifacts, relative to the page being
/// rendered. Resolved by the browser at load time, not by the engine.
#[derive(Debug, Clone, Serialize)]
pub struct AssetRefs {
    pub stylesheet: String,
    pub script: String,
}

impl AssetRefs {
    /// Asset links for a page `depth` directories below the output root.
    pub fn at_depth(depth: usize) -> Self {
        let prefix = "../".repeat(depth);
        Self {
            stylesheet: format!("{prefix}assets/css/custom-styles.css"),
            script: format!("{prefix}assets/js/site-config.js"),
        }
    }
}

/// One row of the article index.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleSummary {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub category: String,
    pub author: String,
    /// Link relative to the index page.
    pub href: String,
    /// Unix timestamp; templates format it with the `format_date` filter.
    pub published: i64,
}

/// Complete context for rendering one page.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub baked: BakedValues,
    pub assets: AssetRefs,
    /// Populated only for the article index template.
    pub articles: Vec<ArticleSummary>,
}

impl PageContext {
    /// Flatten into a Tera context. Baked values sit at the top level;
    /// asset references are grouped under `assets`.
    pub fn to_tera(&self) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("site_name", &self.baked.site_name);
        context.insert("title", &self.baked.title);
        context.insert("description", &self.baked.description);
        context.insert("content", &self.baked.content);
        context.insert("assets", &self.assets);
        context.insert("articles", &self.articles);
        context
    }
}

/// Required bake-time placeholders, per template.
///
/// This is what lets the classifier answer "which pages use placeholder
/// X" without scanning template sources: a template not listed here is
/// treated conservatively as using every bake-time placeholder.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSchema {
    pub template: &'static str,
    pub baked: &'static [BakeKey],
}

pub const SCHEMAS: &[TemplateSchema] = &[
    TemplateSchema {
        template: "page",
        baked: &[
            BakeKey::SiteName,
            BakeKey::Title,
            BakeKey::Description,
            BakeKey::Content,
        ],
    },
    TemplateSchema {
        template: "article",
        baked: &[
            BakeKey::SiteName,
            BakeKey::Title,
            BakeKey::Description,
            BakeKey::Content,
        ],
    },
    TemplateSchema {
        template: "articles",
        baked: &[BakeKey::SiteName, BakeKey::Title, BakeKey::Description],
    },
];

/// Whether a template's rendered output embeds the given bake-time
/// placeholder. Unknown templates answer yes.
pub fn template_uses(template: &str, key: BakeKey) -> bool {
    match SCHEMAS.iter().find(|s| s.template == template) {
        Some(schema) => schema.baked.contains(&key),
        None => true,
    }
}
