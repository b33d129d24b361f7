//! Package record and its supporting value types

use crate::state::{PackageState, Transition};
use crate::Version;
use modman_errors::PackageError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

/// Sentinel URL marking a record whose archive is supplied locally
pub const LOCAL_SOURCE: &str = "local";

/// Package category; Core packages are installed before everything else
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Core,
    Library,
    Cosmetic,
    Gameplay,
    Ui,
    #[default]
    Other,
}

impl Category {
    /// Map a catalog category label onto a category; unknown labels become `Other`
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "Core" => Self::Core,
            "Libraries" => Self::Library,
            "Cosmetic" => Self::Cosmetic,
            "Gameplay" => Self::Gameplay,
            "UI Enhancements" => Self::Ui,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => write!(f, "core"),
            Self::Library => write!(f, "library"),
            Self::Cosmetic => write!(f, "cosmetic"),
            Self::Gameplay => write!(f, "gameplay"),
            Self::Ui => write!(f, "ui"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// One payload file: its path relative to the target root and its content hash
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileEntry {
    pub file: String,
    pub hash: String,
}

impl FileEntry {
    #[must_use]
    pub fn new(file: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            hash: hash.into(),
        }
    }
}

/// Where a package archive comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceUrl {
    /// Download locator from the remote catalog
    Remote(String),
    /// Archive supplied locally, nothing to download
    Local,
}

impl SourceUrl {
    #[must_use]
    pub fn parse(url: &str) -> Self {
        if url == LOCAL_SOURCE {
            Self::Local
        } else {
            Self::Remote(url.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Remote(url) => url,
            Self::Local => LOCAL_SOURCE,
        }
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform variant of the target application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    #[default]
    Steam,
    Oculus,
}

impl AppType {
    /// Download variant name used by the catalog
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Steam => "steam",
            Self::Oculus => "oculus",
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl clap::ValueEnum for AppType {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Steam, Self::Oculus]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// One package in the local or remote catalog
///
/// `name` is the identity key: it matches the same logical package across
/// the local and remote catalogs and inside dependency lists. `id` differs
/// between sources for the same package and is never used for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageRecord {
    pub id: String,
    pub name: String,
    pub version: Version,
    pub target_app_version: Version,
    pub category: Category,
    pub source: SourceUrl,
    pub dependencies: Vec<String>,
    pub files: Vec<FileEntry>,
    pub state: PackageState,
    /// Record originates from the remote catalog
    pub is_remote: bool,
    /// Local archive bound after download or import; never persisted
    pub archive_path: Option<PathBuf>,
    /// Name of the record that pulled this one in as a dependency; never persisted
    pub pulled_in_by: Option<String>,
}

impl PackageRecord {
    /// Create an untracked record with no dependencies or files
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: Version,
        source: SourceUrl,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version,
            target_app_version: Version::default(),
            category: Category::Other,
            source,
            dependencies: Vec::new(),
            files: Vec::new(),
            state: PackageState::Untracked,
            is_remote: false,
            archive_path: None,
            pulled_in_by: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_files(mut self, files: Vec<FileEntry>) -> Self {
        self.files = files;
        self
    }

    /// Move the record through its lifecycle
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed from the current state.
    pub fn transition(&mut self, transition: Transition) -> Result<(), PackageError> {
        self.state = self.state.apply(transition, &self.name)?;
        Ok(())
    }

    /// Whether this record lists `name` among its dependencies
    #[must_use]
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|dep| dep == name)
    }

    /// `name_version` key used for cache and manifest file names
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.name, self.version)
    }

    /// Manifest file name inside the meta directory
    #[must_use]
    pub fn manifest_file_name(&self) -> String {
        format!("{}.json", self.file_stem())
    }

    /// Archive file name inside the download cache
    #[must_use]
    pub fn archive_file_name(&self) -> String {
        format!("{}.zip", self.file_stem())
    }

    /// Ordinal, case-sensitive ordering by name
    #[must_use]
    pub fn cmp_by_name(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }

    /// Short status label for front ends
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        match self.state {
            PackageState::QueuedInstall => "install",
            PackageState::QueuedUpdate => "update pending",
            PackageState::QueuedUninstall => "uninstall",
            PackageState::Installed => "installed",
            PackageState::Ignored => "ignored",
            PackageState::Untracked if self.is_remote => "not installed",
            PackageState::Untracked => "",
        }
    }
}

impl fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (v{})", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::from_label("Core"), Category::Core);
        assert_eq!(Category::from_label("Libraries"), Category::Library);
        assert_eq!(Category::from_label("UI Enhancements"), Category::Ui);
        assert_eq!(Category::from_label("Streaming Tools"), Category::Other);
    }

    #[test]
    fn test_file_names_use_dotted_version() {
        let record = PackageRecord::new(
            "abc",
            "SongCore",
            "2.9.1".parse().unwrap(),
            SourceUrl::Local,
        );
        assert_eq!(record.manifest_file_name(), "SongCore_2.9.1.json");
        assert_eq!(record.archive_file_name(), "SongCore_2.9.1.zip");
    }

    #[test]
    fn test_source_sentinel() {
        assert_eq!(SourceUrl::parse("local"), SourceUrl::Local);
        assert_eq!(
            SourceUrl::parse("/uploads/x.zip").as_str(),
            "/uploads/x.zip"
        );
    }

    #[test]
    fn test_name_ordering_is_case_sensitive() {
        let a = PackageRecord::new("1", "Zeta", Version::default(), SourceUrl::Local);
        let b = PackageRecord::new("2", "alpha", Version::default(), SourceUrl::Local);
        assert_eq!(a.cmp_by_name(&b), Ordering::Less);
    }

    #[test]
    fn test_status_labels() {
        let mut record = PackageRecord::new("1", "x", Version::default(), SourceUrl::Local);
        record.is_remote = true;
        assert_eq!(record.status_label(), "not installed");
        record.transition(Transition::QueueInstall).unwrap();
        assert_eq!(record.status_label(), "install");
    }
}
