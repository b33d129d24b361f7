//! Manifest store: one JSON manifest per installed package

use modman_errors::{Error, PackageError, StorageError};
use modman_types::{Manifest, PackageRecord};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Result of scanning the manifest directory
#[derive(Debug, Default)]
pub struct ManifestScan {
    /// Manifests that parsed, with the file they came from
    pub manifests: Vec<(PathBuf, Manifest)>,
    /// Files that could not be read or parsed
    pub failures: Vec<(PathBuf, Error)>,
}

/// Reads and writes manifests under the `meta` directory
#[derive(Debug, Clone)]
pub struct ManifestStore {
    dir: PathBuf,
}

impl ManifestStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `meta/name_version.json` for a record
    #[must_use]
    pub fn path_for(&self, record: &PackageRecord) -> PathBuf {
        self.dir.join(record.manifest_file_name())
    }

    /// Read every `*.json` manifest
    ///
    /// A file that fails to parse is reported in [`ManifestScan::failures`]
    /// and does not stop the scan. Results are in file-name order.
    ///
    /// # Errors
    ///
    /// Returns an error only if the directory itself cannot be listed.
    pub async fn scan(&self) -> Result<ManifestScan, Error> {
        let mut scan = ManifestScan::default();

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(scan),
            Err(e) => return Err(StorageError::from_io_with_path(&e, &self.dir).into()),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::from_io_with_path(&e, &self.dir))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            match read_manifest(&path).await {
                Ok(manifest) => scan.manifests.push((path, manifest)),
                Err(e) => scan.failures.push((path, e)),
            }
        }

        Ok(scan)
    }

    /// Persist a record's manifest, replacing any previous file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn write(&self, record: &PackageRecord) -> Result<PathBuf, Error> {
        let path = self.path_for(record);
        write_manifest(&path, &record.to_manifest()).await?;
        Ok(path)
    }

    /// Delete a record's manifest; a missing file is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub async fn remove(&self, record: &PackageRecord) -> Result<bool, Error> {
        let path = self.path_for(record);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::from_io_with_path(&e, &path).into()),
        }
    }
}

/// Read a manifest file
///
/// # Errors
/// Returns `PackageError::ManifestParse` if reading or parsing fails.
pub async fn read_manifest(path: &Path) -> Result<Manifest, Error> {
    let parse_error = |message: String| PackageError::ManifestParse {
        path: path.display().to_string(),
        message,
    };

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| parse_error(format!("failed to read manifest: {e}")))?;
    Manifest::from_json(&content).map_err(|e| parse_error(e.to_string()).into())
}

/// Write a manifest file
///
/// # Errors
/// Returns an error if serialization or writing fails.
pub async fn write_manifest(path: &Path, manifest: &Manifest) -> Result<(), Error> {
    let content = manifest.to_json()?;
    fs::write(path, content)
        .await
        .map_err(|e| StorageError::from_io_with_path(&e, path).into())
}
