//! Download cache for fetched archives

use modman_errors::{Error, StorageError};
use modman_types::PackageRecord;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone)]
pub struct DownloadCache {
    dir: PathBuf,
}

impl DownloadCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `cache/name_version.zip` for a record
    #[must_use]
    pub fn archive_path(&self, record: &PackageRecord) -> PathBuf {
        self.dir.join(record.archive_file_name())
    }

    /// Store downloaded bytes for a record and return the file path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn store(&self, record: &PackageRecord, bytes: &[u8]) -> Result<PathBuf, Error> {
        let path = self.archive_path(record);
        fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, &path))?;
        Ok(path)
    }

    /// Remove every file in the cache directory
    ///
    /// Best-effort: entries that cannot be removed are returned alongside
    /// the number of files deleted.
    pub async fn purge(&self) -> (usize, Vec<(PathBuf, Error)>) {
        let mut removed = 0;
        let mut failures = Vec::new();

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return (0, failures),
            Err(e) => {
                failures.push((
                    self.dir.clone(),
                    StorageError::from_io_with_path(&e, &self.dir).into(),
                ));
                return (0, failures);
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    failures.push((self.dir.clone(), e.into()));
                    break;
                }
            };
            let path = entry.path();
            let result = if path.is_dir() {
                fs::remove_dir_all(&path).await
            } else {
                fs::remove_file(&path).await
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => failures.push((path.clone(), Error::io_with_path(&e, path))),
            }
        }

        (removed, failures)
    }
}
