//! Collaborator seams for the remote catalog and archive downloads

use async_trait::async_trait;
use modman_config::CatalogConfig;
use modman_errors::Error;
use modman_types::ListingEntry;

/// Parameters of a remote catalog search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Free-text search; empty lists everything
    pub search: String,
    pub status: String,
    pub sort_field: String,
    pub sort_direction: i32,
}

impl CatalogQuery {
    /// Query everything using the configured filters
    #[must_use]
    pub fn all(config: &CatalogConfig) -> Self {
        Self {
            search: String::new(),
            status: config.status_filter.clone(),
            sort_field: config.sort_field.clone(),
            sort_direction: config.sort_direction,
        }
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self::all(&CatalogConfig::default())
    }
}

/// Source of remote listing entries
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<ListingEntry>, Error>;
}

/// Source of package archive bytes, addressed by a record's source URL
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    async fn fetch_archive(&self, url: &str) -> Result<Vec<u8>, Error>;
}
