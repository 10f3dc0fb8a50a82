//! Merged dataset artifact
//!
//! The flat merged list is persisted as one pretty-printed JSON array so a
//! later run can skip loading and merging the per-user files. The
//! `overwrite` flag decides between reusing that artifact and rebuilding it.

use crate::merge::merge_records;
use crate::query::PostDataset;
use crate::records::{decode_records, MergedPost};
use crate::store::error::{StoreError, StoreResult};
use crate::store::sources::{load_sources, DatasetSources};
use std::io::Write;
use std::path::{Path, PathBuf};

/// On-disk location of the merged record list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedStore {
    path: PathBuf,
}

impl MergedStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the persisted merged list
    pub fn load(&self) -> StoreResult<Vec<MergedPost>> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let raw = serde_json::from_str(&content).map_err(|e| StoreError::json(&self.path, e))?;
        decode_records(raw).map_err(|e| StoreError::record(&self.path, e))
    }

    /// Persist a merged list, replacing any previous artifact
    ///
    /// Writes to a sibling temp file first, then renames over the target.
    pub fn save(&self, posts: &[MergedPost]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(posts).map_err(|e| StoreError::json(&tmp_path, e))?;

        let written = std::fs::File::create(&tmp_path)
            .and_then(|mut file| {
                file.write_all(&json)?;
                file.sync_all()
            })
            .and_then(|_| std::fs::rename(&tmp_path, &self.path));
        if let Err(e) = written {
            if let Err(cleanup) = std::fs::remove_file(&tmp_path) {
                tracing::debug!(path = ?tmp_path, error = %cleanup, "Temp file not removed");
            }
            return Err(StoreError::io(&self.path, e));
        }

        tracing::info!(path = ?self.path, records = posts.len(), "Saved merged dataset");
        Ok(())
    }

    /// Reuse the artifact unless `overwrite` is set or it does not exist yet
    pub fn load_or_build(
        &self,
        sources: &DatasetSources,
        overwrite: bool,
    ) -> StoreResult<Vec<MergedPost>> {
        if !overwrite && self.exists() {
            let posts = self.load()?;
            tracing::info!(path = ?self.path, records = posts.len(), "Reusing merged dataset");
            return Ok(posts);
        }

        let (profiles, histories) = load_sources(sources)?;
        let posts = merge_records(&profiles, &histories)?;
        self.save(&posts)?;
        Ok(posts)
    }
}

impl PostDataset {
    /// Build a dataset from source files, going through the merged artifact
    pub fn from_sources(
        sources: &DatasetSources,
        store: &MergedStore,
        overwrite: bool,
    ) -> StoreResult<Self> {
        Ok(Self::from_records(store.load_or_build(sources, overwrite)?))
    }
}
