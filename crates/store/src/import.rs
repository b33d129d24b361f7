//! Building a record from a standalone archive

use crate::archive::PackageArchive;
use modman_config::constants::SELF_DESCRIPTION;
use modman_errors::{Error, InstallError};
use modman_hash::layout_key;
use modman_types::{AppType, ListingEntry, Manifest, PackageRecord, SourceUrl, Version};
use std::path::{Path, PathBuf};

/// Version given to archives that do not describe themselves
const SYNTHESIZED_VERSION: [u64; 3] = [1, 0, 0];

/// How an imported record was built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOrigin {
    /// `spec.json` held a manifest
    Manifest,
    /// `spec.json` held a remote listing entry
    Listing,
    /// No usable self-description; named after the archive file
    Synthesized,
}

/// Build a record from an archive on disk
///
/// The archive's `spec.json` entry is tried first as a manifest, then as a
/// listing entry. Without one, the record is synthesized from the member
/// layout with per-member hashes computed now. The returned record is bound
/// to `path` so the patch pipeline skips its download.
///
/// # Errors
///
/// Returns `InstallError::CorruptArchive` if the archive cannot be read.
pub async fn record_from_archive(
    path: &Path,
    app_type: AppType,
) -> Result<(PackageRecord, ImportOrigin), Error> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_record(path, app_type))
        .await
        .map_err(|e| InstallError::TaskError {
            message: format!("import task failed: {e}"),
        })?
}

fn read_record(path: PathBuf, app_type: AppType) -> Result<(PackageRecord, ImportOrigin), Error> {
    let mut archive = PackageArchive::open(&path)?;

    let described = archive
        .read_member(SELF_DESCRIPTION)?
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|text| from_self_description(&text, app_type));

    let (mut record, origin) = if let Some(found) = described {
        found
    } else {
        let names: Vec<String> = archive
            .members()?
            .into_iter()
            .map(|member| member.name)
            .collect();
        let record = PackageRecord::new(
            layout_key(&names).to_hex(),
            archive.file_name(),
            Version::new(SYNTHESIZED_VERSION),
            SourceUrl::Local,
        )
        .with_files(archive.file_entries()?);
        (record, ImportOrigin::Synthesized)
    };

    record.archive_path = Some(path);
    Ok((record, origin))
}

fn from_self_description(text: &str, app_type: AppType) -> Option<(PackageRecord, ImportOrigin)> {
    if let Ok(manifest) = Manifest::from_json(text) {
        let mut record = PackageRecord::from_manifest(manifest);
        // flags describe the machine the archive was built on
        record.state = modman_types::PackageState::Untracked;
        return Some((record, ImportOrigin::Manifest));
    }

    let entry = ListingEntry::from_json(text).ok()?;
    PackageRecord::from_listing(&entry, app_type)
        .ok()
        .map(|record| (record, ImportOrigin::Listing))
}
