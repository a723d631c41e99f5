//! Shared site script generation.
//!
//! Pages load one script that carries the navigation tree, social
//! links, and site metadata as a `SITE_CONFIG` object, plus the small
//! helpers every page uses. Like the stylesheet this is a pure
//! function of its inputs; the navigation forest arrives already
//! ordered and pruned of inactive items.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::SiteMetadata;
use crate::navigation::NavNode;

/// One navigation entry as pages consume it. Optional attributes are
/// omitted rather than serialized as null.
#[derive(Debug, Serialize)]
struct NavEntry {
    title: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "class")]
    css_class: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<NavEntry>,
}

fn nav_entries(forest: &[NavNode]) -> Vec<NavEntry> {
    forest
        .iter()
        .map(|node| NavEntry {
            title: node.item.title.clone(),
            url: node.item.target_url.clone(),
            target: node.item.open_in_new_tab.then_some("_blank"),
            css_class: node.item.css_class.clone(),
            children: nav_entries(&node.children),
        })
        .collect()
}

/// Render the shared site script.
pub fn site_config_script(
    meta: &SiteMetadata,
    forest: &[NavNode],
    social: &BTreeMap<String, String>,
) -> EngineResult<String> {
    let navigation = serde_json::to_string_pretty(&nav_entries(forest))
        .map_err(|e| EngineError::Internal(e.into()))?;
    let social = serde_json::to_string_pretty(social).map_err(|e| EngineError::Internal(e.into()))?;
    let name = serde_json::to_string(&meta.name).map_err(|e| EngineError::Internal(e.into()))?;
    let url = serde_json::to_string(&meta.url).map_err(|e| EngineError::Internal(e.into()))?;
    let description =
        serde_json::to_string(&meta.description).map_err(|e| EngineError::Internal(e.into()))?;

    Ok(format!(
        r#"/* Auto-generated site configuration. Loaded by every page. */

const SITE_CONFIG = {{
    siteName: {name},
    siteUrl: {url},
    description: {description},
    navigation: {navigation},
    social: {social},
    currentYear: new Date().getFullYear()
}};

function initNavigation() {{
    const currentPage = window.location.pathname.split('/').pop() || 'index.html';
    SITE_CONFIG.navigation.forEach(item => {{
        item.active = item.url === currentPage;
    }});
}}

function toggleMobileMenu() {{
    const menu = document.getElementById('mobile-menu');
    if (menu) {{
        menu.classList.toggle('hidden');
    }}
}}

document.addEventListener('DOMContentLoaded', () => {{
    initNavigation();
    const yearElement = document.getElementById('current-year');
    if (yearElement) {{
        yearElement.textContent = SITE_CONFIG.currentYear;
    }}
}});
"#
    ))
}
