//! Archive integrity verification

use modman_errors::{Error, InstallError};
use modman_hash::ContentHash;
use modman_store::PackageArchive;
use modman_types::PackageRecord;
use std::collections::HashMap;
use std::path::Path;

/// Result of a successful verification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verification {
    /// Members whose hash matched
    pub verified: usize,
    /// Members with no recorded hash; tolerated
    pub unlisted: Vec<String>,
}

/// Check every non-directory member of `archive` against `record.files`
///
/// Members without an expected hash are collected in
/// [`Verification::unlisted`]. Hashes compare case-insensitively.
///
/// # Errors
///
/// Returns `InstallError::CorruptArchive` if the archive cannot be opened or
/// read, and `InstallError::IntegrityMismatch` on the first member whose
/// content does not match.
pub fn verify_archive(archive: &Path, record: &PackageRecord) -> Result<Verification, Error> {
    let expected: HashMap<&str, &str> = record
        .files
        .iter()
        .map(|f| (f.file.as_str(), f.hash.as_str()))
        .collect();

    let mut archive = PackageArchive::open(archive)?;
    let mut verification = Verification::default();

    archive.for_each_file(|name, bytes| {
        let Some(want) = expected.get(name) else {
            verification.unlisted.push(name.to_string());
            return Ok(());
        };
        let actual = ContentHash::from_data(bytes);
        if !actual.matches_hex(want) {
            return Err(InstallError::IntegrityMismatch {
                package: record.name.clone(),
                member: name.to_string(),
                expected: (*want).to_string(),
                actual: actual.to_hex(),
            }
            .into());
        }
        verification.verified += 1;
        Ok(())
    })?;

    Ok(verification)
}

/// [`verify_archive`] on the blocking pool
///
/// # Errors
///
/// See [`verify_archive`]; also fails if the blocking task cannot complete.
pub async fn verify_archive_async(
    archive: &Path,
    record: &PackageRecord,
) -> Result<Verification, Error> {
    let archive = archive.to_path_buf();
    let record = record.clone();
    tokio::task::spawn_blocking(move || verify_archive(&archive, &record))
        .await
        .map_err(|e| InstallError::TaskError {
            message: format!("verify task failed: {e}"),
        })?
}
