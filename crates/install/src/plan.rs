//! Preview of what a patch run will do

use modman_resolver::{Catalog, PatchQueue};
use modman_types::Version;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
    pub name: String,
    pub version: Version,
    /// Installed version being replaced, for updates
    pub replaces: Option<Version>,
}

/// Removals and installs queued for the next patch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchPlan {
    pub remove: Vec<PlannedChange>,
    pub install: Vec<PlannedChange>,
}

impl PatchPlan {
    #[must_use]
    pub fn from_queue(catalog: &Catalog, queue: &PatchQueue) -> Self {
        let mut plan = Self::default();

        for name in &queue.uninstall {
            if let Some(record) = catalog.find_local(name) {
                plan.remove.push(PlannedChange {
                    name: name.clone(),
                    version: record.version.clone(),
                    replaces: None,
                });
            }
        }

        for name in &queue.update {
            let Some(local) = catalog.find_local(name) else {
                continue;
            };
            plan.remove.push(PlannedChange {
                name: name.clone(),
                version: local.version.clone(),
                replaces: None,
            });
            if let Some(remote) = catalog.find_remote(name) {
                plan.install.push(PlannedChange {
                    name: name.clone(),
                    version: remote.version.clone(),
                    replaces: Some(local.version.clone()),
                });
            }
        }

        for name in &queue.install {
            if let Some(record) = catalog.find_local(name) {
                plan.install.push(PlannedChange {
                    name: name.clone(),
                    version: record.version.clone(),
                    replaces: None,
                });
            }
        }

        plan
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.install.is_empty()
    }
}

impl fmt::Display for PatchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for change in &self.remove {
            writeln!(f, "  - {} {}", change.name, change.version)?;
        }
        for change in &self.install {
            match &change.replaces {
                Some(old) => writeln!(f, "  ~ {} {} -> {}", change.name, old, change.version)?,
                None => writeln!(f, "  + {} {}", change.name, change.version)?,
            }
        }
        Ok(())
    }
}
