//! Atomic artifact writes.
//!
//! Artifacts are staged as temp files next to their destination and
//! then renamed into place. Rename within one directory is atomic on
//! the filesystems we target, so a crash leaves either the previous
//! artifact or the new one, never a truncated file. Staging is also
//! what lets a mutation produce several artifacts all-or-nothing: all
//! temp files are written first, and only once every one succeeded are
//! they renamed.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{EngineError, EngineResult};

/// Process-wide staging sequence, so concurrent stages of the same
/// destination never collide on the temp name.
static STAGE_SEQ: AtomicU64 = AtomicU64::new(0);

/// A fully written temp file awaiting rename into its destination.
#[derive(Debug)]
pub struct StagedArtifact {
    temp: PathBuf,
    dest: PathBuf,
    committed: bool,
}

impl StagedArtifact {
    /// Write `bytes` to a temp file next to `dest`, creating parent
    /// directories as needed.
    pub fn stage(dest: &Path, bytes: &[u8]) -> EngineResult<Self> {
        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|source| EngineError::Write {
            path: parent.to_path_buf(),
            source,
        })?;

        let seq = STAGE_SEQ.fetch_add(1, Ordering::Relaxed);
        let file_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        let temp = parent.join(format!(".{file_name}.{seq}.tmp"));

        fs::write(&temp, bytes).map_err(|source| EngineError::Write {
            path: temp.clone(),
            source,
        })?;

        Ok(Self {
            temp,
            dest: dest.to_path_buf(),
            committed: false,
        })
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Rename the temp file over the destination, retrying once before
    /// surfacing the failure. Temp file cleanup happens in Drop.
    pub fn commit(mut self) -> EngineResult<()> {
        if fs::rename(&self.temp, &self.dest).is_err() {
            fs::rename(&self.temp, &self.dest).map_err(|source| EngineError::Write {
                path: self.dest.clone(),
                source,
            })?;
        }
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedArtifact {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp);
        }
    }
}
