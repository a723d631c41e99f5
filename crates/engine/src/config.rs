//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::Result;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Sqlite connection URL (default: `sqlite://sitesmith.db`).
    ///
    /// The database file is created on first use.
    pub database_url: String,

    /// Directory the generated site is published into (default: ./site).
    pub output_dir: PathBuf,

    /// Directory holding the Tera theme (default: ./templates).
    pub templates_dir: PathBuf,

    /// Subfolder of the output directory that article pages and the
    /// article index are written into (default: "articles").
    pub content_dir: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://sitesmith.db".to_string());

        let output_dir = env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./site"));

        let templates_dir = env::var("TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./templates"));

        let content_dir = env::var("CONTENT_DIR").unwrap_or_else(|_| "articles".to_string());

        Ok(Self {
            database_url,
            output_dir,
            templates_dir,
            content_dir,
        })
    }
}
