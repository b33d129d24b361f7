use serde::{Deserialize, Serialize};
use std::fmt;

use super::FailureContext;

/// Ordered phases of a patch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchPhase {
    Removal,
    UpdateSubstitution,
    Download,
    Install,
    Cleanup,
}

impl PatchPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Removal => "removal",
            Self::UpdateSubstitution => "update_substitution",
            Self::Download => "download",
            Self::Install => "install",
            Self::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for PatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of a patch run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PatchEvent {
    PhaseStarted { phase: PatchPhase, packages: usize },

    PackageRemoved {
        package: String,
        version: String,
        files_removed: usize,
        files_missing: usize,
    },

    DownloadStarted { package: String, url: String },

    DownloadCompleted { package: String, bytes: u64 },

    /// Every listed file in the archive matched its recorded hash
    PackageVerified {
        package: String,
        files: usize,
        unlisted: usize,
    },

    PackageInstalled {
        package: String,
        version: String,
        files: usize,
    },

    /// Per-package failure; the run continues with the remaining packages
    PackageFailed {
        package: String,
        phase: PatchPhase,
        failure: FailureContext,
    },

    CachePurged { archives: usize },

    Completed {
        removed: usize,
        installed: usize,
        failed: usize,
    },
}
