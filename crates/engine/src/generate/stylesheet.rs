//! Shared stylesheet generation.
//!
//! The stylesheet is a pure function of the branding record: CSS custom
//! properties in `:root`, a font import for the configured family, and
//! a small set of utility classes that reference the variables. Pages
//! never embed color values, so a palette change rewrites this one file
//! and nothing else.

use crate::models::Branding;

/// Known font families and their hosted import URLs. Anything else
/// falls back to the system stack without an import.
const FONT_IMPORTS: &[(&str, &str)] = &[
    (
        "Inter",
        "https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&display=swap",
    ),
    (
        "Roboto",
        "https://fonts.googleapis.com/css2?family=Roboto:wght@300;400;500;700&display=swap",
    ),
    (
        "Open Sans",
        "https://fonts.googleapis.com/css2?family=Open+Sans:wght@300;400;500;600;700&display=swap",
    ),
    (
        "Lato",
        "https://fonts.googleapis.com/css2?family=Lato:wght@300;400;700&display=swap",
    ),
    (
        "Montserrat",
        "https://fonts.googleapis.com/css2?family=Montserrat:wght@300;400;500;600;700&display=swap",
    ),
];

fn font_block(family: &str) -> String {
    for (name, url) in FONT_IMPORTS {
        if name.eq_ignore_ascii_case(family) {
            return format!(
                "@import url('{url}');\nbody {{ font-family: '{name}', system-ui, sans-serif; }}"
            );
        }
    }
    "body { font-family: system-ui, -apple-system, sans-serif; }".to_string()
}

/// Render the shared stylesheet for the given branding.
pub fn stylesheet(branding: &Branding) -> String {
    let mut css = format!(
        r#"/* Auto-generated stylesheet. Edit branding, not this file. */
:root {{
    --brand-primary: {primary};
    --brand-secondary: {secondary};
    --brand-accent: {accent};
    --brand-dark: {dark};
    --brand-light: {light};
}}

{font}

.btn-brand {{
    background-color: var(--brand-primary);
    color: white;
    padding: 0.75rem 1.5rem;
    border-radius: 8px;
    font-weight: 500;
    transition: background-color 0.2s;
}}

.btn-brand:hover {{
    background-color: var(--brand-secondary);
}}

.btn-brand-outline {{
    border: 2px solid var(--brand-primary);
    color: var(--brand-primary);
    padding: 0.75rem 1.5rem;
    border-radius: 8px;
    font-weight: 500;
    background: transparent;
    transition: all 0.2s;
}}

.btn-brand-outline:hover {{
    background-color: var(--brand-primary);
    color: white;
}}

.accent {{
    color: var(--brand-accent);
}}

.nav-link {{
    color: var(--brand-dark);
    transition: color 0.2s;
}}

.nav-link:hover,
.nav-link.active {{
    color: var(--brand-primary);
}}

.card-hover {{
    background-color: var(--brand-light);
    transition: transform 0.3s ease, box-shadow 0.3s ease;
}}

.card-hover:hover {{
    transform: translateY(-4px);
    box-shadow: 0 20px 40px rgba(0, 0, 0, 0.1);
}}
"#,
        primary = branding.primary_color,
        secondary = branding.secondary_color,
        accent = branding.accent_color,
        dark = branding.dark_color,
        light = branding.light_color,
        font = font_block(&branding.font_family),
    );

    if !branding.custom_css.trim().is_empty() {
        css.push_str("\n/* Custom CSS */\n");
        css.push_str(branding.custom_css.trim_end());
        css.push('\n');
    }

    css
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_lands_in_root_block() {
        let css = stylesheet(&Branding::default());
        assert!(css.contains("--brand-primary: #1b5fa3;"));
        assert!(css.contains("--brand-secondary: #144a84;"));
        assert!(css.contains("--brand-accent: #f9943b;"));
        assert!(css.contains("family=Inter"));
    }

    #[test]
    fn utilities_reference_variables_not_hex() {
        let css = stylesheet(&Branding::default());
        let root_end = css.find('}').unwrap_or(0);
        // Color literals appear only inside :root.
        assert!(!css[root_end..].contains('#'), "hex outside :root");
        assert!(css.contains("background-color: var(--brand-primary)"));
    }

    #[test]
    fn deterministic_for_equal_input() {
        let branding = Branding {
            primary_color: "#336699".into(),
            ..Branding::default()
        };
        assert_eq!(stylesheet(&branding), stylesheet(&branding));
    }

    #[test]
    fn unknown_font_falls_back_to_system_stack() {
        let branding = Branding {
            font_family: "Comic Serif".into(),
            ..Branding::default()
        };
        let css = stylesheet(&branding);
        assert!(!css.contains("@import"));
        assert!(css.contains("system-ui"));
    }

    #[test]
    fn custom_css_is_appended_verbatim() {
        let branding = Branding {
            custom_css: ".hero { min-height: 60vh; }".into(),
            ..Branding::default()
        };
        let css = stylesheet(&branding);
        assert!(css.ends_with(".hero { min-height: 60vh; }\n"));
    }
}
