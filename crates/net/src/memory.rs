//! In-memory catalog and archive source
//!
//! Serves a fixed set of listing entries and archive blobs. Used for offline
//! operation against a mirrored catalog and in tests.

use crate::source::{ArchiveSource, CatalogQuery, CatalogSource};
use async_trait::async_trait;
use modman_errors::{Error, NetworkError};
use modman_types::ListingEntry;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemorySource {
    entries: Vec<ListingEntry>,
    archives: HashMap<String, Vec<u8>>,
    failing: Mutex<HashSet<String>>,
    fetched: Mutex<Vec<String>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entry(mut self, entry: ListingEntry) -> Self {
        self.entries.push(entry);
        self
    }

    #[must_use]
    pub fn with_archive(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.archives.insert(url.into(), bytes);
        self
    }

    /// Make every fetch of `url` fail until [`Self::restore`] is called
    pub fn fail(&self, url: impl Into<String>) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(url.into());
        }
    }

    pub fn restore(&self, url: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.remove(url);
        }
    }

    /// URLs fetched so far, in order
    #[must_use]
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CatalogSource for MemorySource {
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<ListingEntry>, Error> {
        let needle = query.search.to_lowercase();
        Ok(self
            .entries
            .iter()
            .filter(|entry| needle.is_empty() || entry.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ArchiveSource for MemorySource {
    async fn fetch_archive(&self, url: &str) -> Result<Vec<u8>, Error> {
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(url.to_string());
        }

        let failing = self
            .failing
            .lock()
            .map(|f| f.contains(url))
            .unwrap_or(false);
        if failing {
            return Err(NetworkError::ConnectionRefused(url.to_string()).into());
        }

        self.archives.get(url).cloned().ok_or_else(|| {
            NetworkError::HttpError {
                status: 404,
                message: format!("no archive at {url}"),
            }
            .into()
        })
    }
}
