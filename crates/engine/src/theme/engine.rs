//! Theme engine — Tera templates with inheritance and strict rendering.

use std::path::Path;

use dashmap::DashMap;
use tera::Tera;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::context::PageContext;

/// Theme engine for rendering pages.
///
/// Tera handles inheritance (`{% extends %}` / `{% block %}`) natively
/// and fails on unknown variables, which gives the engine its contract
/// that an unresolved placeholder is a render error, never empty output.
pub struct ThemeEngine {
    tera: Tera,
    /// Cache mapping requested template names to resolved file names.
    resolve_cache: DashMap<String, String>,
}

impl ThemeEngine {
    /// Load every `*.html` template under the given directory.
    pub fn new(template_dir: &Path) -> EngineResult<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern.to_str().ok_or_else(|| {
            EngineError::Validation("template directory path is not valid UTF-8".to_string())
        })?;

        let mut tera = Tera::new(pattern_str).map_err(|e| EngineError::render(pattern_str, &e))?;
        Self::register_filters(&mut tera);

        let count = tera.get_template_names().count();
        debug!(count, "loaded templates");

        Ok(Self {
            tera,
            resolve_cache: DashMap::new(),
        })
    }

    /// Create a theme engine with no templates.
    pub fn empty() -> Self {
        let mut tera = Tera::default();
        Self::register_filters(&mut tera);
        Self {
            tera,
            resolve_cache: DashMap::new(),
        }
    }

    /// Build a theme engine from in-memory template sources.
    ///
    /// Sources are added as one batch so `{% extends %}` chains resolve
    /// regardless of ordering.
    pub fn from_raw_templates(templates: &[(&str, &str)]) -> EngineResult<Self> {
        let mut tera = Tera::default();
        Self::register_filters(&mut tera);
        tera.add_raw_templates(templates.to_vec())
            .map_err(|e| EngineError::render("(raw templates)", &e))?;

        Ok(Self {
            tera,
            resolve_cache: DashMap::new(),
        })
    }

    /// Resolve a template name to a loaded template.
    ///
    /// Tries the name as given, then with `.html` appended. Hits are
    /// cached; misses are not, so newly added templates are picked up.
    pub fn resolve(&self, name: &str) -> Option<String> {
        if let Some(cached) = self.resolve_cache.get(name) {
            return Some(cached.clone());
        }

        for candidate in [name.to_string(), format!("{name}.html")] {
            if self.tera.get_template(&candidate).is_ok() {
                self.resolve_cache.insert(name.to_string(), candidate.clone());
                return Some(candidate);
            }
        }

        None
    }

    /// Render a page through the named template.
    ///
    /// A missing template or an unresolved placeholder aborts with a
    /// render error; nothing is ever emitted as empty text.
    pub fn render_page(&self, template: &str, context: &PageContext) -> EngineResult<String> {
        let Some(resolved) = self.resolve(template) else {
            return Err(EngineError::Render {
                template: template.to_string(),
                reason: "template not found".to_string(),
            });
        };

        self.tera
            .render(&resolved, &context.to_tera())
            .map_err(|e| EngineError::render(template, &e))
    }

    /// Register the engine's custom filters on a Tera instance.
    fn register_filters(tera: &mut Tera) {
        // Format Unix timestamps as human-readable dates in listings.
        tera.register_filter(
            "format_date",
            |value: &tera::Value, _args: &std::collections::HashMap<String, tera::Value>| {
                let timestamp = match value {
                    tera::Value::Number(n) => n.as_i64().unwrap_or(0),
                    _ => return Ok(tera::Value::String(String::new())),
                };

                let formatted = chrono::DateTime::from_timestamp(timestamp, 0)
                    .map(|dt| dt.format("%B %-d, %Y").to_string())
                    .unwrap_or_else(|| "Unknown date".to_string());

                Ok(tera::Value::String(formatted))
            },
        );
    }
}

impl std::fmt::Debug for ThemeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeEngine")
            .field("template_count", &self.tera.get_template_names().count())
            .field("cache_size", &self.resolve_cache.len())
            .finish()
    }
}
