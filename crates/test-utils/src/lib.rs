//! Sitesmith test utilities.
//!
//! Raw theme sources and fixture builders shared by the engine's
//! integration tests. Kept free of engine types so the crate can sit
//! below the engine in the dependency graph.

/// A minimal working theme: a base layout plus the three templates the
/// engine renders by default. Feed it to the theme engine's raw
/// template constructor.
pub fn default_theme() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "base.html",
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{% block head_title %}{{ title }} - {{ site_name }}{% endblock head_title %}</title>
    <meta name="description" content="{{ description }}">
    <link rel="stylesheet" href="{{ assets.stylesheet }}">
</head>
<body>
    <div id="mobile-menu" class="hidden"></div>
    <main>{% block main %}{% endblock main %}</main>
    <footer>&copy; <span id="current-year"></span> {{ site_name }}</footer>
    <script src="{{ assets.script }}"></script>
</body>
</html>
"#,
        ),
        (
            "page.html",
            r#"{% extends "base.html" %}
{% block main %}
<h1>{{ title }}</h1>
{{ content | safe }}
{% endblock main %}
"#,
        ),
        (
            "article.html",
            r#"{% extends "base.html" %}
{% block main %}
<article>
    <h1>{{ title }}</h1>
    {{ content | safe }}
</article>
{% endblock main %}
"#,
        ),
        (
            "articles.html",
            r#"{% extends "base.html" %}
{% block head_title %}Articles - {{ site_name }}{% endblock head_title %}
{% block main %}
<h1>Articles</h1>
<ul>
{% for article in articles %}
    <li class="card-hover">
        <a href="{{ article.href }}">{{ article.title }}</a>
        <span>{{ article.published | format_date }}</span>
        <p>{{ article.excerpt }}</p>
    </li>
{% endfor %}
</ul>
{% endblock main %}
"#,
        ),
    ]
}

/// The default theme plus a template that references a value the
/// engine never provides. Rendering through it must fail.
pub fn theme_with_broken_template() -> Vec<(&'static str, &'static str)> {
    let mut theme = default_theme();
    theme.push((
        "broken.html",
        r#"{% extends "base.html" %}
{% block main %}{{ value_nobody_provides }}{% endblock main %}
"#,
    ));
    theme
}

/// A branding update payload with a recognizable palette.
pub fn test_palette() -> serde_json::Value {
    serde_json::json!({
        "primary_color": "#112233",
        "secondary_color": "#445566",
        "accent_color": "#778899",
    })
}
