//! Engine error types.

use std::path::PathBuf;

use thiserror::Error;

/// Engine errors.
///
/// Store errors (`Validation`, `NotFound`, `Conflict`) are reported before
/// any write commits; generator errors (`Render`, `Write`) abort the
/// mutation with the previously published output left intact.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("render failed for template '{template}': {reason}")]
    Render { template: String, reason: String },

    #[error("failed to write artifact {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    /// Build a `Render` error from a Tera failure, flattening the error
    /// chain into the reason so the offending placeholder is visible.
    pub fn render(template: &str, error: &tera::Error) -> Self {
        use std::error::Error as _;

        let mut reason = error.to_string();
        let mut source = error.source();
        while let Some(inner) = source {
            reason.push_str(": ");
            reason.push_str(&inner.to_string());
            source = inner.source();
        }

        Self::Render {
            template: template.to_string(),
            reason,
        }
    }
}

/// Result type alias using EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
