//! Database models — typed CRUD over the configuration store.

pub mod branding;
pub mod content;
pub mod navigation;
pub mod settings;
pub mod social;

pub use branding::{Branding, BrandingUpdate};
pub use content::{ArticleRecord, ContentStatus, PageRecord, SaveArticle, SavePage};
pub use navigation::{CreateNavigationItem, NavigationItem, UpdateNavigationItem};
pub use settings::SiteMetadata;
pub use social::{SocialLink, SocialLinkInput};
