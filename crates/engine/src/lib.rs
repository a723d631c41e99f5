//! Sitesmith engine library.
//!
//! The engine keeps a deployed folder of plain HTML/CSS/JS permanently in
//! sync with structured site configuration held in an embedded sqlite
//! store. Mutations to navigation, branding, social links, settings, and
//! page/article content regenerate exactly the artifacts they invalidate,
//! and every output file is replaced atomically so readers never observe a
//! half-written state.
//!
//! The HTTP layer, authentication, and media handling are external
//! collaborators; they drive the engine through [`SiteEngine`].

pub mod config;
pub mod db;
pub mod error;
pub mod generate;
pub mod models;
pub mod navigation;
pub mod state;
pub mod theme;

pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use state::SiteEngine;
