use modman_errors::Error;
use modman_events::PatchPhase;

/// A package that failed during a patch run
#[derive(Debug, Clone)]
pub struct PackageFailure {
    pub package: String,
    pub phase: PatchPhase,
    pub error: Error,
}

/// Outcome of one patch run
#[derive(Debug, Clone, Default)]
pub struct PatchReport {
    /// Packages whose files and manifest were removed (including updated ones)
    pub removed: Vec<String>,
    /// Packages installed, in installation order
    pub installed: Vec<String>,
    /// Updates dropped because no remote record was found
    pub dropped_updates: Vec<String>,
    pub failures: Vec<PackageFailure>,
    /// Files deleted from the download cache
    pub cache_purged: usize,
}

impl PatchReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn failed_in(&self, phase: PatchPhase) -> Vec<&str> {
        self.failures
            .iter()
            .filter(|f| f.phase == phase)
            .map(|f| f.package.as_str())
            .collect()
    }
}
