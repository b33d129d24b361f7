//! Persisted manifest format
//!
//! One manifest is written per installed package:
//!
//! ```json
//! { "id": "...", "name": "...", "version": [1, 2, 0], "url": "...",
//!   "config": { "ignore": 0, "is_local": 1, "is_remote": 0,
//!               "need_update": 0, "need_install": 0, "need_uninstall": 0 },
//!   "dependencies": ["..."],
//!   "files": [{ "file": "...", "hash": "..." }] }
//! ```

use crate::package::{FileEntry, PackageRecord, SourceUrl};
use crate::state::{PackageState, StateFlags};
use crate::Version;
use modman_errors::PackageError;
use serde::{Deserialize, Serialize};

/// On-disk manifest of one package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: Version,
    pub url: String,
    pub config: ManifestConfig,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// Lifecycle flags, stored as `0`/`1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManifestConfig {
    #[serde(with = "int_bool", default)]
    pub ignore: bool,
    #[serde(with = "int_bool", default)]
    pub is_local: bool,
    #[serde(with = "int_bool", default)]
    pub is_remote: bool,
    #[serde(with = "int_bool", default)]
    pub need_update: bool,
    #[serde(with = "int_bool", default)]
    pub need_install: bool,
    #[serde(with = "int_bool", default)]
    pub need_uninstall: bool,
}

impl From<StateFlags> for ManifestConfig {
    fn from(flags: StateFlags) -> Self {
        Self {
            ignore: flags.ignore,
            is_local: flags.is_local,
            is_remote: flags.is_remote,
            need_update: flags.need_update,
            need_install: flags.need_install,
            need_uninstall: flags.need_uninstall,
        }
    }
}

impl From<ManifestConfig> for StateFlags {
    fn from(config: ManifestConfig) -> Self {
        Self {
            ignore: config.ignore,
            is_local: config.is_local,
            is_remote: config.is_remote,
            need_update: config.need_update,
            need_install: config.need_install,
            need_uninstall: config.need_uninstall,
        }
    }
}

impl Manifest {
    /// Parse a manifest from JSON text
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidManifest` if the text is not a valid manifest.
    pub fn from_json(content: &str) -> Result<Self, PackageError> {
        serde_json::from_str(content).map_err(|e| PackageError::InvalidManifest {
            message: e.to_string(),
        })
    }

    /// Serialize the manifest to JSON text
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidManifest` if serialization fails.
    pub fn to_json(&self) -> Result<String, PackageError> {
        serde_json::to_string_pretty(self).map_err(|e| PackageError::InvalidManifest {
            message: e.to_string(),
        })
    }
}

impl PackageRecord {
    /// Build a record from a persisted manifest
    #[must_use]
    pub fn from_manifest(manifest: Manifest) -> Self {
        let flags = StateFlags::from(manifest.config);
        Self {
            id: manifest.id,
            name: manifest.name,
            version: manifest.version,
            target_app_version: Version::default(),
            category: crate::Category::Other,
            source: SourceUrl::parse(&manifest.url),
            dependencies: manifest.dependencies,
            files: manifest.files,
            state: PackageState::from_flags(&flags),
            is_remote: flags.is_remote,
            archive_path: None,
            pulled_in_by: None,
        }
    }

    /// Produce the manifest form of this record
    #[must_use]
    pub fn to_manifest(&self) -> Manifest {
        Manifest {
            id: self.id.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            url: self.source.as_str().to_string(),
            config: self.state.to_flags(self.is_remote).into(),
            dependencies: self.dependencies.clone(),
            files: self.files.clone(),
        }
    }
}

mod int_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Int(i64),
        Bool(bool),
    }

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S>(value: &bool, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Flag::deserialize(deserializer)? {
            Flag::Int(value) => value != 0,
            Flag::Bool(value) => value,
        })
    }
}
