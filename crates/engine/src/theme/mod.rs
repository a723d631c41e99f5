//! Template rendering.
//!
//! Tera templates with inheritance, plus the typed render contexts that
//! keep bake-time values and reference-time asset links apart.

pub mod context;
pub mod engine;

pub use context::{template_uses, ArticleSummary, AssetRefs, BakeKey, BakedValues, PageContext};
pub use engine::ThemeEngine;
