//! Package archive access (.zip files)
//!
//! All functions here are synchronous; async callers run them inside
//! `tokio::task::spawn_blocking`.

use modman_errors::{Error, InstallError};
use modman_hash::ContentHash;
use modman_types::FileEntry;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// One member of an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    pub name: String,
    pub is_dir: bool,
}

/// An opened package archive
pub struct PackageArchive {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
}

impl PackageArchive {
    /// Open an archive, validating its central directory
    ///
    /// # Errors
    ///
    /// Returns `InstallError::CorruptArchive` if the file cannot be opened or
    /// is not a readable zip archive.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let unreadable = |message: String| InstallError::CorruptArchive {
            path: path.display().to_string(),
            message,
        };

        let file = File::open(path).map_err(|e| unreadable(e.to_string()))?;
        let zip =
            ZipArchive::new(BufReader::new(file)).map_err(|e| unreadable(e.to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the archive, extension included
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Member names and kinds, in archive order
    ///
    /// # Errors
    ///
    /// Returns an error if a local header cannot be read.
    pub fn members(&mut self) -> Result<Vec<ArchiveMember>, Error> {
        let mut members = Vec::with_capacity(self.zip.len());
        for i in 0..self.zip.len() {
            let entry = self.zip.by_index(i).map_err(|e| corrupt(&self.path, &e))?;
            members.push(ArchiveMember {
                name: entry.name().to_string(),
                is_dir: entry.is_dir(),
            });
        }
        Ok(members)
    }

    /// Read one member by name, `None` if absent
    ///
    /// # Errors
    ///
    /// Returns an error if the member exists but cannot be decompressed.
    pub fn read_member(&mut self, name: &str) -> Result<Option<Vec<u8>>, Error> {
        let mut entry = match self.zip.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(corrupt(&self.path, &e)),
        };
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).map_err(|e| InstallError::CorruptArchive {
            path: self.path.display().to_string(),
            message: format!("{name}: {e}"),
        })?;
        Ok(Some(buf))
    }

    /// Visit every non-directory member with its bytes
    ///
    /// # Errors
    ///
    /// Returns the first error from reading a member or from `visit`.
    pub fn for_each_file<F>(&mut self, mut visit: F) -> Result<(), Error>
    where
        F: FnMut(&str, &[u8]) -> Result<(), Error>,
    {
        for i in 0..self.zip.len() {
            let mut entry = self.zip.by_index(i).map_err(|e| corrupt(&self.path, &e))?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut buf = Vec::new();
            entry
                .read_to_end(&mut buf)
                .map_err(|e| InstallError::CorruptArchive {
                    path: self.path.display().to_string(),
                    message: format!("{name}: {e}"),
                })?;
            visit(&name, &buf)?;
        }
        Ok(())
    }

    /// Per-member content hashes of every non-directory member
    ///
    /// # Errors
    ///
    /// Returns an error if a member cannot be read.
    pub fn file_entries(&mut self) -> Result<Vec<FileEntry>, Error> {
        let mut files = Vec::new();
        self.for_each_file(|name, bytes| {
            files.push(FileEntry::new(name, ContentHash::from_data(bytes).to_hex()));
            Ok(())
        })?;
        Ok(files)
    }

    /// Extract every non-directory member under `root`
    ///
    /// Parent directories are created as needed and existing files are
    /// overwritten. Returns the extracted members with their content hashes.
    ///
    /// # Errors
    ///
    /// Returns `InstallError::ExtractionFailed` for a member whose path would
    /// escape `root`, and `InstallError::FilesystemError` if a file cannot be written.
    pub fn extract_to(&mut self, root: &Path) -> Result<Vec<FileEntry>, Error> {
        let mut extracted = Vec::new();

        for i in 0..self.zip.len() {
            let mut entry = self.zip.by_index(i).map_err(|e| corrupt(&self.path, &e))?;
            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            let relative = entry
                .enclosed_name()
                .ok_or_else(|| InstallError::ExtractionFailed {
                    message: format!("unsafe member path: {name}"),
                })?;
            let outpath = root.join(relative);

            let mut buf = Vec::new();
            entry
                .read_to_end(&mut buf)
                .map_err(|e| InstallError::CorruptArchive {
                    path: self.path.display().to_string(),
                    message: format!("{name}: {e}"),
                })?;

            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent).map_err(|e| fs_error("create_dir", parent, &e))?;
            }
            std::fs::write(&outpath, &buf).map_err(|e| fs_error("write", &outpath, &e))?;

            extracted.push(FileEntry::new(
                name,
                ContentHash::from_data(&buf).to_hex(),
            ));
        }

        Ok(extracted)
    }

}

fn corrupt(path: &Path, err: &zip::result::ZipError) -> Error {
    InstallError::CorruptArchive {
        path: path.display().to_string(),
        message: err.to_string(),
    }
    .into()
}

fn fs_error(operation: &str, path: &Path, err: &std::io::Error) -> Error {
    InstallError::FilesystemError {
        operation: operation.to_string(),
        path: path.display().to_string(),
        message: err.to_string(),
    }
    .into()
}

/// Open `archive` and extract it under `root` on the blocking pool
///
/// # Errors
///
/// Returns an error if the archive is corrupt, a member escapes `root`, or
/// the blocking task fails.
pub async fn extract_archive(archive: &Path, root: &Path) -> Result<Vec<FileEntry>, Error> {
    let archive = archive.to_path_buf();
    let root = root.to_path_buf();

    tokio::task::spawn_blocking(move || PackageArchive::open(&archive)?.extract_to(&root))
        .await
        .map_err(|e| InstallError::TaskError {
            message: format!("extract task failed: {e}"),
        })?
}
