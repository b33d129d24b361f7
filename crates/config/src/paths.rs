//! Resolved on-disk layout for one installation root

use crate::constants::{APP_DIR, CACHE_DIR, META_DIR};
use modman_errors::{Error, StorageError};
use std::path::{Path, PathBuf};

/// Directories used by a single installation root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    /// Target application root; archive members are extracted here
    pub root: PathBuf,
    /// `<root>/.modman`
    pub app_dir: PathBuf,
    /// `<root>/.modman/cache`
    pub cache_dir: PathBuf,
    /// `<root>/.modman/meta`
    pub meta_dir: PathBuf,
}

impl InstallPaths {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let app_dir = root.join(APP_DIR);
        Self {
            cache_dir: app_dir.join(CACHE_DIR),
            meta_dir: app_dir.join(META_DIR),
            app_dir,
            root,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the bookkeeping directories if they do not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the root does not exist or a directory cannot be created.
    pub async fn ensure(&self) -> Result<(), Error> {
        if !tokio::fs::try_exists(&self.root).await.unwrap_or(false) {
            return Err(StorageError::PathNotFound {
                path: self.root.display().to_string(),
            }
            .into());
        }

        for dir in [&self.app_dir, &self.cache_dir, &self.meta_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| StorageError::from_io_with_path(&e, dir))?;
        }
        tracing::debug!(root = %self.root.display(), "installation directories ready");
        Ok(())
    }
}
