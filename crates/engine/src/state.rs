//! The site engine: config store plus artifact regeneration, behind
//! one handle.
//!
//! Every mutation follows the same sequence: classify the mutation
//! into the artifact set it invalidates, take the per-artifact-class
//! locks in canonical order, open a store transaction, apply the
//! write, regenerate the invalidated artifacts from the transaction's
//! view of the data, stage them as temp files, rename them into place,
//! and only then commit the transaction. A failure anywhere before the
//! commit rolls the store back and drops the staged files, so the
//! published site and the store never disagree.

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::config::Config;
use crate::db;
use crate::error::EngineResult;
use crate::generate::classifier::{self, ArtifactSet, Mutation, PageRef, PageSet};
use crate::generate::{pages, script, stylesheet, StagedArtifact};
use crate::models::{
    settings, ArticleRecord, Branding, BrandingUpdate, ContentStatus, CreateNavigationItem,
    NavigationItem, PageRecord, SaveArticle, SavePage, SiteMetadata, SocialLink, SocialLinkInput,
    UpdateNavigationItem,
};
use crate::navigation::{self, CascadePolicy, NavNode};
use crate::theme::{template_uses, BakeKey, PageContext, ThemeEngine};

/// Template used for the article listing index.
const ARTICLES_INDEX_TEMPLATE: &str = "articles";

/// One mutex per artifact class. Mutations serialize per class, so
/// writers of disjoint classes proceed in parallel while two stylesheet
/// writers queue up.
#[derive(Debug, Default)]
struct ArtifactLocks {
    stylesheet: Mutex<()>,
    script: Mutex<()>,
    pages: Mutex<()>,
}

/// Guards held for the duration of one mutation. Unused slots stay
/// `None` so unrelated mutations never contend.
struct LockSet<'a> {
    _stylesheet: Option<MutexGuard<'a, ()>>,
    _script: Option<MutexGuard<'a, ()>>,
    _pages: Option<MutexGuard<'a, ()>>,
}

impl ArtifactLocks {
    /// Acquire the locks for `set`, always in the same order so two
    /// mutations needing overlapping classes cannot deadlock.
    async fn acquire(&self, set: &ArtifactSet) -> LockSet<'_> {
        let stylesheet = if set.stylesheet {
            Some(self.stylesheet.lock().await)
        } else {
            None
        };
        let script = if set.script {
            Some(self.script.lock().await)
        } else {
            None
        };
        let pages = if set.pages != PageSet::None {
            Some(self.pages.lock().await)
        } else {
            None
        };
        LockSet {
            _stylesheet: stylesheet,
            _script: script,
            _pages: pages,
        }
    }
}

struct EngineInner {
    pool: SqlitePool,
    theme: ThemeEngine,
    output_dir: PathBuf,
    content_dir: String,
    locks: ArtifactLocks,
}

/// Handle to the engine. Cheap to clone; all clones share the pool,
/// theme, and locks.
#[derive(Clone)]
pub struct SiteEngine {
    inner: Arc<EngineInner>,
}

impl SiteEngine {
    /// Open the store and load the theme from the configured template
    /// directory. A missing or broken theme degrades to an empty one;
    /// store mutations still work, page generation reports `Render`.
    pub async fn new(config: &Config) -> EngineResult<Self> {
        let theme = match ThemeEngine::new(&config.templates_dir) {
            Ok(theme) => theme,
            Err(error) => {
                warn!(
                    path = %config.templates_dir.display(),
                    %error,
                    "theme failed to load, starting with no templates"
                );
                ThemeEngine::empty()
            }
        };
        Self::with_theme(config, theme).await
    }

    /// Open the store with a caller-supplied theme.
    pub async fn with_theme(config: &Config, theme: ThemeEngine) -> EngineResult<Self> {
        let pool = db::create_pool(config).await?;
        db::run_migrations(&pool).await?;
        Ok(Self {
            inner: Arc::new(EngineInner {
                pool,
                theme,
                output_dir: config.output_dir.clone(),
                content_dir: config.content_dir.clone(),
                locks: ArtifactLocks::default(),
            }),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    // ----- navigation -----

    pub async fn create_navigation(
        &self,
        input: CreateNavigationItem,
    ) -> EngineResult<NavigationItem> {
        let set = classifier::classify(&Mutation::NavigationCreated);
        let _locks = self.inner.locks.acquire(&set).await;
        let mut tx = self.inner.pool.begin().await?;
        let item = navigation::create(&mut tx, input).await?;
        let staged = self.stage_set(&mut tx, &set).await?;
        commit_staged(staged)?;
        tx.commit().await?;
        info!(id = item.id, title = %item.title, "navigation item created");
        Ok(item)
    }

    pub async fn update_navigation(
        &self,
        id: i64,
        input: UpdateNavigationItem,
    ) -> EngineResult<NavigationItem> {
        let set = classifier::classify(&Mutation::NavigationUpdated);
        let _locks = self.inner.locks.acquire(&set).await;
        let mut tx = self.inner.pool.begin().await?;
        let item = navigation::update(&mut tx, id, input).await?;
        let staged = self.stage_set(&mut tx, &set).await?;
        commit_staged(staged)?;
        tx.commit().await?;
        info!(id, "navigation item updated");
        Ok(item)
    }

    /// Delete a navigation item. The cascade policy is explicit: either
    /// the whole subtree goes, or children are spliced into the deleted
    /// item's place. Returns the number of items removed.
    pub async fn delete_navigation(&self, id: i64, policy: CascadePolicy) -> EngineResult<u64> {
        let set = classifier::classify(&Mutation::NavigationDeleted);
        let _locks = self.inner.locks.acquire(&set).await;
        let mut tx = self.inner.pool.begin().await?;
        let removed = navigation::delete(&mut tx, id, policy).await?;
        let staged = self.stage_set(&mut tx, &set).await?;
        commit_staged(staged)?;
        tx.commit().await?;
        info!(id, removed, ?policy, "navigation item deleted");
        Ok(removed)
    }

    /// Reorder the children of one parent. `ordered` must name every
    /// current child exactly once.
    pub async fn reorder_navigation(
        &self,
        parent_id: Option<i64>,
        ordered: &[i64],
    ) -> EngineResult<()> {
        let set = classifier::classify(&Mutation::NavigationReordered);
        let _locks = self.inner.locks.acquire(&set).await;
        let mut tx = self.inner.pool.begin().await?;
        navigation::reorder(&mut tx, parent_id, ordered).await?;
        let staged = self.stage_set(&mut tx, &set).await?;
        commit_staged(staged)?;
        tx.commit().await?;
        info!(?parent_id, "navigation reordered");
        Ok(())
    }

    pub async fn list_navigation(&self) -> EngineResult<Vec<NavigationItem>> {
        let mut conn = self.inner.pool.acquire().await?;
        NavigationItem::list_all(&mut conn).await
    }

    pub async fn navigation_tree(&self, active_only: bool) -> EngineResult<Vec<NavNode>> {
        let mut conn = self.inner.pool.acquire().await?;
        navigation::forest(&mut conn, active_only).await
    }

    // ----- branding -----

    pub async fn branding(&self) -> EngineResult<Branding> {
        let mut conn = self.inner.pool.acquire().await?;
        Branding::get(&mut conn).await
    }

    /// Update branding and regenerate the stylesheet. Passing the
    /// version previously read turns a lost update into a `Conflict`.
    pub async fn update_branding(
        &self,
        update: BrandingUpdate,
        expected_version: Option<i64>,
    ) -> EngineResult<Branding> {
        let set = classifier::classify(&Mutation::BrandingUpdated);
        let _locks = self.inner.locks.acquire(&set).await;
        let mut tx = self.inner.pool.begin().await?;
        let branding = Branding::update(&mut tx, update, expected_version).await?;
        let staged = self.stage_set(&mut tx, &set).await?;
        commit_staged(staged)?;
        tx.commit().await?;
        info!(version = branding.version, "branding updated");
        Ok(branding)
    }

    // ----- social links -----

    pub async fn social_links(&self) -> EngineResult<Vec<SocialLink>> {
        let mut conn = self.inner.pool.acquire().await?;
        SocialLink::list(&mut conn).await
    }

    pub async fn upsert_social(&self, input: SocialLinkInput) -> EngineResult<SocialLink> {
        let set = classifier::classify(&Mutation::SocialUpdated);
        let _locks = self.inner.locks.acquire(&set).await;
        let mut tx = self.inner.pool.begin().await?;
        let link = SocialLink::upsert(&mut tx, input).await?;
        let staged = self.stage_set(&mut tx, &set).await?;
        commit_staged(staged)?;
        tx.commit().await?;
        info!(platform = %link.platform, enabled = link.enabled, "social link saved");
        Ok(link)
    }

    // ----- settings -----

    pub async fn setting(&self, key: &str) -> EngineResult<Option<serde_json::Value>> {
        let mut conn = self.inner.pool.acquire().await?;
        settings::get(&mut conn, key).await
    }

    pub async fn set_setting(&self, key: &str, value: serde_json::Value) -> EngineResult<()> {
        let set = classifier::classify(&Mutation::SettingChanged { key: key.to_string() });
        let _locks = self.inner.locks.acquire(&set).await;
        let mut tx = self.inner.pool.begin().await?;
        settings::set(&mut tx, key, &value).await?;
        let staged = self.stage_set(&mut tx, &set).await?;
        commit_staged(staged)?;
        tx.commit().await?;
        info!(key, "setting changed");
        Ok(())
    }

    pub async fn site_metadata(&self) -> EngineResult<SiteMetadata> {
        let mut conn = self.inner.pool.acquire().await?;
        settings::site_metadata(&mut conn).await
    }

    // ----- pages and articles -----

    pub async fn save_page(&self, input: SavePage) -> EngineResult<PageRecord> {
        let set = classifier::classify(&Mutation::PageSaved {
            slug: input.slug.clone(),
        });
        let _locks = self.inner.locks.acquire(&set).await;
        let mut tx = self.inner.pool.begin().await?;
        let page = PageRecord::upsert(&mut tx, input).await?;
        let staged = self.stage_set(&mut tx, &set).await?;
        commit_staged(staged)?;
        tx.commit().await?;
        info!(slug = %page.slug, status = ?page.status, "page saved");
        Ok(page)
    }

    pub async fn save_article(&self, input: SaveArticle) -> EngineResult<ArticleRecord> {
        let set = classifier::classify(&Mutation::ArticleSaved {
            slug: input.slug.clone(),
        });
        let _locks = self.inner.locks.acquire(&set).await;
        let mut tx = self.inner.pool.begin().await?;
        let article = ArticleRecord::upsert(&mut tx, input).await?;
        let staged = self.stage_set(&mut tx, &set).await?;
        commit_staged(staged)?;
        tx.commit().await?;
        info!(slug = %article.slug, status = ?article.status, "article saved");
        Ok(article)
    }

    pub async fn get_page(&self, slug: &str) -> EngineResult<Option<PageRecord>> {
        let mut conn = self.inner.pool.acquire().await?;
        PageRecord::find_by_slug(&mut conn, slug).await
    }

    pub async fn get_article(&self, slug: &str) -> EngineResult<Option<ArticleRecord>> {
        let mut conn = self.inner.pool.acquire().await?;
        ArticleRecord::find_by_slug(&mut conn, slug).await
    }

    pub async fn list_pages(&self) -> EngineResult<Vec<PageRecord>> {
        let mut conn = self.inner.pool.acquire().await?;
        PageRecord::list(&mut conn).await
    }

    pub async fn list_articles(&self) -> EngineResult<Vec<ArticleRecord>> {
        let mut conn = self.inner.pool.acquire().await?;
        ArticleRecord::list(&mut conn).await
    }

    // ----- regeneration -----

    /// Regenerate every artifact from the current store state. Running
    /// this twice against an unchanged store produces byte-identical
    /// output.
    pub async fn rebuild_all(&self) -> EngineResult<()> {
        let set = classifier::classify(&Mutation::RebuildAll);
        let _locks = self.inner.locks.acquire(&set).await;
        let mut tx = self.inner.pool.begin().await?;
        let staged = self.stage_set(&mut tx, &set).await?;
        let count = staged.len();
        commit_staged(staged)?;
        tx.commit().await?;
        info!(artifacts = count, "full rebuild complete");
        Ok(())
    }

    /// Stage every artifact in `set`, reading config through `conn` so
    /// the bytes reflect the open transaction's view.
    async fn stage_set(
        &self,
        conn: &mut SqliteConnection,
        set: &ArtifactSet,
    ) -> EngineResult<Vec<StagedArtifact>> {
        let out = &self.inner.output_dir;
        let mut staged = Vec::new();

        if set.stylesheet {
            let branding = Branding::get(&mut *conn).await?;
            let css = stylesheet::stylesheet(&branding);
            staged.push(StagedArtifact::stage(
                &pages::stylesheet_path(out),
                css.as_bytes(),
            )?);
        }

        if set.script {
            let meta = settings::site_metadata(&mut *conn).await?;
            let forest = navigation::forest(&mut *conn, true).await?;
            let social = SocialLink::handle_map(&mut *conn).await?;
            let js = script::site_config_script(&meta, &forest, &social)?;
            staged.push(StagedArtifact::stage(
                &pages::script_path(out),
                js.as_bytes(),
            )?);
        }

        match &set.pages {
            PageSet::None => {}
            PageSet::Refs(refs) => {
                let meta = settings::site_metadata(&mut *conn).await?;
                for page_ref in refs {
                    self.stage_page_ref(&mut *conn, &meta, page_ref, &mut staged)
                        .await?;
                }
            }
            PageSet::UsingPlaceholder(key) => {
                let meta = settings::site_metadata(&mut *conn).await?;
                self.stage_pages_using(&mut *conn, &meta, *key, &mut staged)
                    .await?;
            }
            PageSet::All => {
                let meta = settings::site_metadata(&mut *conn).await?;
                for page in PageRecord::list_published(&mut *conn).await? {
                    self.stage_page(&meta, &page, &mut staged)?;
                }
                for article in ArticleRecord::list_published(&mut *conn).await? {
                    self.stage_article(&meta, &article, &mut staged)?;
                }
                self.stage_articles_index(&mut *conn, &meta, &mut staged)
                    .await?;
            }
        }

        Ok(staged)
    }

    async fn stage_page_ref(
        &self,
        conn: &mut SqliteConnection,
        meta: &SiteMetadata,
        page_ref: &PageRef,
        staged: &mut Vec<StagedArtifact>,
    ) -> EngineResult<()> {
        match page_ref {
            PageRef::Page(slug) => {
                // Drafts produce no file; a missing record is treated
                // the same way (the reference may outlive the record).
                if let Some(page) = PageRecord::find_by_slug(&mut *conn, slug).await?
                    && page.status == ContentStatus::Published
                {
                    self.stage_page(meta, &page, staged)?;
                }
            }
            PageRef::Article(slug) => {
                if let Some(article) = ArticleRecord::find_by_slug(&mut *conn, slug).await?
                    && article.status == ContentStatus::Published
                {
                    self.stage_article(meta, &article, staged)?;
                }
            }
            PageRef::ArticlesIndex => {
                self.stage_articles_index(&mut *conn, meta, staged).await?;
            }
        }
        Ok(())
    }

    /// Stage every published page whose template bakes in `key`.
    async fn stage_pages_using(
        &self,
        conn: &mut SqliteConnection,
        meta: &SiteMetadata,
        key: BakeKey,
        staged: &mut Vec<StagedArtifact>,
    ) -> EngineResult<()> {
        for page in PageRecord::list_published(&mut *conn).await? {
            if template_uses(&page.template, key) {
                self.stage_page(meta, &page, staged)?;
            }
        }
        for article in ArticleRecord::list_published(&mut *conn).await? {
            if template_uses(&article.template, key) {
                self.stage_article(meta, &article, staged)?;
            }
        }
        if template_uses(ARTICLES_INDEX_TEMPLATE, key) {
            self.stage_articles_index(&mut *conn, meta, staged).await?;
        }
        Ok(())
    }

    fn stage_page(
        &self,
        meta: &SiteMetadata,
        page: &PageRecord,
        staged: &mut Vec<StagedArtifact>,
    ) -> EngineResult<()> {
        let context = pages::page_context(&meta.name, page);
        let path = pages::page_path(&self.inner.output_dir, &page.slug);
        self.render_into(&page.template, &context, path, staged)
    }

    fn stage_article(
        &self,
        meta: &SiteMetadata,
        article: &ArticleRecord,
        staged: &mut Vec<StagedArtifact>,
    ) -> EngineResult<()> {
        let context = pages::article_context(&meta.name, article);
        let path = pages::article_path(&self.inner.output_dir, &self.inner.content_dir, &article.slug);
        self.render_into(&article.template, &context, path, staged)
    }

    async fn stage_articles_index(
        &self,
        conn: &mut SqliteConnection,
        meta: &SiteMetadata,
        staged: &mut Vec<StagedArtifact>,
    ) -> EngineResult<()> {
        let articles = ArticleRecord::list_published(&mut *conn).await?;
        let context = pages::articles_index_context(&meta.name, &meta.description, &articles);
        let path = pages::articles_index_path(&self.inner.output_dir, &self.inner.content_dir);
        self.render_into(ARTICLES_INDEX_TEMPLATE, &context, path, staged)
    }

    fn render_into(
        &self,
        template: &str,
        context: &PageContext,
        path: PathBuf,
        staged: &mut Vec<StagedArtifact>,
    ) -> EngineResult<()> {
        let html = self.inner.theme.render_page(template, context)?;
        staged.push(StagedArtifact::stage(&path, html.as_bytes())?);
        Ok(())
    }
}

impl std::fmt::Debug for SiteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteEngine")
            .field("output_dir", &self.inner.output_dir)
            .field("content_dir", &self.inner.content_dir)
            .finish_non_exhaustive()
    }
}

/// Rename all staged artifacts into place. Runs after every artifact
/// rendered and wrote successfully, and before the store transaction
/// commits, so a rename failure aborts the store write too. Renames of
/// already-written temp files only fail for environmental reasons
/// (permissions, the destination turned into a directory), in which
/// case earlier renames stand; the eventual retry or rebuild converges
/// the rest.
fn commit_staged(staged: Vec<StagedArtifact>) -> EngineResult<()> {
    for artifact in staged {
        artifact.commit()?;
    }
    Ok(())
}
