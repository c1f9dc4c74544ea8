use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;

/// Persists phase outputs. The core only picks stable logical paths;
/// retention and layout policy beyond that belong to the caller.
pub trait ArtifactStore: Send + Sync {
    fn save_json(&self, data: &Value, logical_path: &str) -> Result<PathBuf>;
    fn save_bytes(&self, data: &[u8], logical_path: &str) -> Result<PathBuf>;
}

/// Directory-backed store, `metrics/` by default.
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn prepare(&self, logical_path: &str) -> Result<PathBuf> {
        let path = self.root.join(logical_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }
}

impl Default for FsArtifactStore {
    fn default() -> Self {
        Self::new("metrics")
    }
}

impl ArtifactStore for FsArtifactStore {
    fn save_json(&self, data: &Value, logical_path: &str) -> Result<PathBuf> {
        let path = self.prepare(logical_path)?;
        std::fs::write(&path, serde_json::to_string_pretty(data)?)?;
        log::info!("saved {}", path.display());
        Ok(path)
    }

    fn save_bytes(&self, data: &[u8], logical_path: &str) -> Result<PathBuf> {
        let path = self.prepare(logical_path)?;
        std::fs::write(&path, data)?;
        log::info!("saved {} ({} bytes)", path.display(), data.len());
        Ok(path)
    }
}
