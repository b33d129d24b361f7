//! Remote catalog listing entries
//!
//! The remote catalog returns one JSON object per package, each carrying
//! per-platform download variants. Only the variant matching the configured
//! application type (or the `universal` fallback) is kept on the record.

use crate::package::{AppType, Category, FileEntry, PackageRecord, SourceUrl};
use crate::state::PackageState;
use crate::Version;
use modman_errors::PackageError;
use serde::{Deserialize, Serialize};

/// Download variant that works on every platform
pub const UNIVERSAL_VARIANT: &str = "universal";

/// One package as returned by the remote catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(rename = "gameVersion", default)]
    pub game_version: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub dependencies: Vec<ListingDependency>,
    #[serde(default)]
    pub downloads: Vec<ListingDownload>,
}

/// Dependency reference; the catalog sends either a bare name or an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingDependency {
    Name(String),
    Entry { name: String },
}

impl ListingDependency {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Entry { name } => name,
        }
    }
}

/// Platform-specific download descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDownload {
    #[serde(rename = "type")]
    pub platform: String,
    pub url: String,
    #[serde(rename = "hashMd5", default)]
    pub hashes: Vec<FileEntry>,
}

impl ListingEntry {
    /// Parse a single listing entry from JSON text
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidListing` if the text is not a listing entry.
    pub fn from_json(content: &str) -> Result<Self, PackageError> {
        serde_json::from_str(content).map_err(|e| PackageError::InvalidListing {
            message: e.to_string(),
        })
    }

    /// Pick the download for `app_type`, falling back to the universal variant
    #[must_use]
    pub fn select_download(&self, app_type: AppType) -> Option<&ListingDownload> {
        self.downloads
            .iter()
            .find(|d| d.platform == app_type.as_str())
            .or_else(|| {
                self.downloads
                    .iter()
                    .find(|d| d.platform == UNIVERSAL_VARIANT)
            })
    }
}

impl PackageRecord {
    /// Build a record from a remote listing entry
    ///
    /// Unparsable versions fall back to `0.0.0`; unknown category labels map
    /// to `Other`.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::NoCompatibleVariant` when the entry has no
    /// download for `app_type` and no universal download.
    pub fn from_listing(entry: &ListingEntry, app_type: AppType) -> Result<Self, PackageError> {
        let download =
            entry
                .select_download(app_type)
                .ok_or_else(|| PackageError::NoCompatibleVariant {
                    name: entry.name.clone(),
                    platform: app_type.to_string(),
                })?;

        Ok(Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            version: Version::parse_or_default(&entry.version),
            target_app_version: Version::parse_or_default(&entry.game_version),
            category: Category::from_label(&entry.category),
            source: SourceUrl::Remote(download.url.clone()),
            dependencies: entry
                .dependencies
                .iter()
                .map(|dep| dep.name().to_string())
                .collect(),
            files: download.hashes.clone(),
            state: PackageState::Untracked,
            is_remote: true,
            archive_path: None,
            pulled_in_by: None,
        })
    }
}
