//! Maps config mutations to the artifacts they invalidate.
//!
//! The classifier is deliberately free of I/O: it looks only at the
//! mutation itself, never at the database, so its decisions can be
//! tested as plain functions. Over-approximation is acceptable
//! (regenerating an unchanged artifact is wasted work, nothing more);
//! under-approximation would leave stale output and is a bug.

use crate::models::settings;
use crate::theme::BakeKey;

/// A config mutation, described just precisely enough to classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    NavigationCreated,
    NavigationUpdated,
    NavigationDeleted,
    NavigationReordered,
    BrandingUpdated,
    SocialUpdated,
    SettingChanged { key: String },
    PageSaved { slug: String },
    ArticleSaved { slug: String },
    RebuildAll,
}

/// Reference to a single page artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    Page(String),
    Article(String),
    ArticlesIndex,
}

/// Which page artifacts a mutation invalidates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageSet {
    #[default]
    None,
    /// An explicit list of pages.
    Refs(Vec<PageRef>),
    /// Every page whose template bakes in the given value.
    UsingPlaceholder(BakeKey),
    All,
}

/// The set of artifacts a mutation invalidates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArtifactSet {
    pub stylesheet: bool,
    pub script: bool,
    pub pages: PageSet,
}

impl ArtifactSet {
    pub fn is_empty(&self) -> bool {
        !self.stylesheet && !self.script && self.pages == PageSet::None
    }

    fn script_only() -> Self {
        Self {
            script: true,
            ..Self::default()
        }
    }
}

/// Classify a mutation into the artifact set it invalidates.
///
/// Navigation and social data live only in the shared script; branding
/// lives only in the stylesheet. Page content is baked into that page's
/// file; articles additionally appear in the listing index. Site
/// settings are the crossover case: all three live in the script, and
/// the site name is also baked into any page whose template uses it.
pub fn classify(mutation: &Mutation) -> ArtifactSet {
    match mutation {
        Mutation::NavigationCreated
        | Mutation::NavigationUpdated
        | Mutation::NavigationDeleted
        | Mutation::NavigationReordered
        | Mutation::SocialUpdated => ArtifactSet::script_only(),

        Mutation::BrandingUpdated => ArtifactSet {
            stylesheet: true,
            ..ArtifactSet::default()
        },

        Mutation::SettingChanged { key } => match key.as_str() {
            settings::SITE_NAME => ArtifactSet {
                script: true,
                pages: PageSet::UsingPlaceholder(BakeKey::SiteName),
                ..ArtifactSet::default()
            },
            settings::SITE_URL | settings::SITE_DESCRIPTION => ArtifactSet::script_only(),
            // Unknown keys feed no artifact.
            _ => ArtifactSet::default(),
        },

        Mutation::PageSaved { slug } => ArtifactSet {
            pages: PageSet::Refs(vec![PageRef::Page(slug.clone())]),
            ..ArtifactSet::default()
        },

        Mutation::ArticleSaved { slug } => ArtifactSet {
            pages: PageSet::Refs(vec![
                PageRef::Article(slug.clone()),
                PageRef::ArticlesIndex,
            ]),
            ..ArtifactSet::default()
        },

        Mutation::RebuildAll => ArtifactSet {
            stylesheet: true,
            script: true,
            pages: PageSet::All,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn navigation_touches_only_the_script() {
        for mutation in [
            Mutation::NavigationCreated,
            Mutation::NavigationUpdated,
            Mutation::NavigationDeleted,
            Mutation::NavigationReordered,
        ] {
            let set = classify(&mutation);
            assert!(set.script, "{mutation:?}");
            assert!(!set.stylesheet, "{mutation:?}");
            assert_eq!(set.pages, PageSet::None, "{mutation:?}");
        }
    }

    #[test]
    fn branding_touches_only_the_stylesheet() {
        let set = classify(&Mutation::BrandingUpdated);
        assert!(set.stylesheet);
        assert!(!set.script);
        assert_eq!(set.pages, PageSet::None);
    }

    #[test]
    fn social_touches_only_the_script() {
        assert_eq!(classify(&Mutation::SocialUpdated), ArtifactSet::script_only());
    }

    #[test]
    fn site_name_invalidates_script_and_baked_pages() {
        let set = classify(&Mutation::SettingChanged {
            key: settings::SITE_NAME.into(),
        });
        assert!(set.script);
        assert!(!set.stylesheet);
        assert_eq!(set.pages, PageSet::UsingPlaceholder(BakeKey::SiteName));
    }

    #[test]
    fn url_and_description_settings_invalidate_script_only() {
        for key in [settings::SITE_URL, settings::SITE_DESCRIPTION] {
            let set = classify(&Mutation::SettingChanged { key: key.into() });
            assert_eq!(set, ArtifactSet::script_only(), "{key}");
        }
    }

    #[test]
    fn unknown_setting_invalidates_nothing() {
        let set = classify(&Mutation::SettingChanged {
            key: "analytics_id".into(),
        });
        assert!(set.is_empty());
    }

    #[test]
    fn page_save_invalidates_that_page() {
        let set = classify(&Mutation::PageSaved {
            slug: "about".into(),
        });
        assert!(!set.stylesheet);
        assert!(!set.script);
        assert_eq!(set.pages, PageSet::Refs(vec![PageRef::Page("about".into())]));
    }

    #[test]
    fn article_save_also_invalidates_the_index() {
        let set = classify(&Mutation::ArticleSaved {
            slug: "launch".into(),
        });
        assert_eq!(
            set.pages,
            PageSet::Refs(vec![
                PageRef::Article("launch".into()),
                PageRef::ArticlesIndex,
            ])
        );
    }

    #[test]
    fn rebuild_covers_everything() {
        let set = classify(&Mutation::RebuildAll);
        assert!(set.stylesheet);
        assert!(set.script);
        assert_eq!(set.pages, PageSet::All);
    }
}
