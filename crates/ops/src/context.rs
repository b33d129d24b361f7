//! Operations context for dependency injection

use modman_config::{Config, InstallPaths};
use modman_errors::{Error, OpsError};
use modman_events::{EventEmitter, EventSender};
use modman_net::{ArchiveSource, CatalogSource, HttpCatalog};
use modman_resolver::{Catalog, PatchQueue};
use modman_store::Store;
use std::sync::Arc;

/// Operations context providing access to all system components
///
/// Operations assume they are the only writer to the installation root's
/// manifest and cache directories; callers running several processes
/// against one root must serialize them.
pub struct OpsCtx {
    /// Configuration
    pub config: Config,
    /// Resolved directory layout
    pub paths: InstallPaths,
    /// Manifest store and download cache
    pub store: Store,
    /// Remote catalog
    pub catalog_source: Arc<dyn CatalogSource>,
    /// Archive downloads
    pub archives: Arc<dyn ArchiveSource>,
    /// Event sender for progress reporting
    pub tx: EventSender,
}

impl std::fmt::Debug for OpsCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpsCtx")
            .field("config", &self.config)
            .field("paths", &self.paths)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

/// In-memory catalogs and queues carried between operations
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub catalog: Catalog,
    pub queue: PatchQueue,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Builder for [`OpsCtx`]
#[derive(Default)]
pub struct OpsContextBuilder {
    config: Option<Config>,
    paths: Option<InstallPaths>,
    catalog_source: Option<Arc<dyn CatalogSource>>,
    archives: Option<Arc<dyn ArchiveSource>>,
    tx: Option<EventSender>,
}

impl OpsContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the layout derived from `paths.install_root`
    #[must_use]
    pub fn with_paths(mut self, paths: InstallPaths) -> Self {
        self.paths = Some(paths);
        self
    }

    #[must_use]
    pub fn with_catalog_source(mut self, source: Arc<dyn CatalogSource>) -> Self {
        self.catalog_source = Some(source);
        self
    }

    #[must_use]
    pub fn with_archive_source(mut self, source: Arc<dyn ArchiveSource>) -> Self {
        self.archives = Some(source);
        self
    }

    /// Use the HTTP catalog from the configured network settings for both
    /// catalog queries and archive downloads
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is missing or the HTTP client
    /// cannot be created.
    pub fn with_http_sources(self) -> Result<Self, Error> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| missing("config"))?;
        let http = Arc::new(HttpCatalog::from_config(&config.network)?);
        Ok(self
            .with_catalog_source(http.clone())
            .with_archive_source(http))
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if any required component is missing, or if no
    /// installation root is configured.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let config = self.config.ok_or_else(|| missing("config"))?;
        let paths = match self.paths {
            Some(paths) => paths,
            None => config.install_paths()?,
        };
        let catalog_source = self
            .catalog_source
            .ok_or_else(|| missing("catalog_source"))?;
        let archives = self.archives.ok_or_else(|| missing("archive_source"))?;
        let tx = self.tx.ok_or_else(|| missing("event_sender"))?;

        Ok(OpsCtx {
            store: Store::new(&paths),
            config,
            paths,
            catalog_source,
            archives,
            tx,
        })
    }
}

fn missing(component: &str) -> Error {
    OpsError::MissingComponent {
        component: component.to_string(),
    }
    .into()
}
