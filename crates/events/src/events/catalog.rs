use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Local and remote catalog loading
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CatalogEvent {
    /// Installed manifests read from disk
    LocalLoaded { packages: usize, skipped: usize },

    /// A manifest could not be read and was left out of the local catalog
    ManifestSkipped {
        path: String,
        failure: FailureContext,
    },

    /// Remote catalog fetched and converted
    RemoteLoaded { packages: usize, app_type: String },

    /// A remote entry could not be converted into a record
    RemoteEntrySkipped { name: String, reason: String },

    /// An installed package has a newer remote version
    UpdateAvailable {
        package: String,
        installed: String,
        available: String,
    },
}
