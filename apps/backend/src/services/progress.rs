//! Progress snapshot persisted as a JSON file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use flashcard_core::ProgressSnapshot;

use crate::error::Result;

pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored snapshot, or a fresh one when nothing was saved yet.
    pub async fn load(&self) -> Result<ProgressSnapshot> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ProgressSnapshot::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, snapshot: &ProgressSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(snapshot)?;

        // replace atomically
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), "progress saved");
        Ok(())
    }
}
