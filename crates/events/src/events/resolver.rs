use serde::{Deserialize, Serialize};

/// Which patch queue a resolver decision touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueKind {
    Install,
    Update,
    Uninstall,
}

/// Resolver domain events for queue planning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResolverEvent {
    /// Package added to a queue
    Queued {
        package: String,
        version: String,
        queue: QueueKind,
        /// Set when the package was pulled in as a dependency
        pulled_in_by: Option<String>,
    },

    /// Pending operation removed from a queue
    Dequeued { package: String, queue: QueueKind },

    /// Package has no remote counterpart and will be installed from its local archive
    LocalOnly { package: String },

    /// Dependency not found in either catalog
    UnresolvedDependency { package: String, dependency: String },

    /// Removal refused because installed packages still need it
    RemovalBlocked {
        package: String,
        dependents: Vec<String>,
    },
}
