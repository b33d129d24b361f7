#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! On-disk state for modman
//!
//! Everything lives under `<install_root>/.modman`: `meta/` holds one
//! manifest per installed package and `cache/` holds downloaded archives
//! until the end of a patch run. The store assumes a single writer.

mod archive;
mod cache;
mod import;
mod manifests;

pub use archive::{extract_archive, ArchiveMember, PackageArchive};
pub use cache::DownloadCache;
pub use import::{record_from_archive, ImportOrigin};
pub use manifests::{read_manifest, write_manifest, ManifestScan, ManifestStore};

use modman_config::InstallPaths;

/// Manifest store and download cache for one installation root
#[derive(Debug, Clone)]
pub struct Store {
    pub manifests: ManifestStore,
    pub cache: DownloadCache,
}

impl Store {
    #[must_use]
    pub fn new(paths: &InstallPaths) -> Self {
        Self {
            manifests: ManifestStore::new(&paths.meta_dir),
            cache: DownloadCache::new(&paths.cache_dir),
        }
    }
}
