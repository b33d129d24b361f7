use serde::{Deserialize, Serialize};

use crate::EventSource;
use modman_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod catalog;
pub mod general;
pub mod patch;
pub mod resolver;

pub use catalog::*;
pub use general::*;
pub use patch::*;
pub use resolver::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Local/remote catalog loading and update checks
    Catalog(CatalogEvent),

    /// Queue planning decisions
    Resolver(ResolverEvent),

    /// Patch pipeline progress
    Patch(PatchEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::General,
            Self::Catalog(_) => EventSource::Catalog,
            Self::Resolver(_) => EventSource::Resolver,
            Self::Patch(_) => EventSource::Patch,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. } | GeneralEvent::OperationFailed { .. })
            | Self::Patch(PatchEvent::PackageFailed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Catalog(
                CatalogEvent::ManifestSkipped { .. } | CatalogEvent::RemoteEntrySkipped { .. },
            )
            | Self::Resolver(
                ResolverEvent::LocalOnly { .. }
                | ResolverEvent::UnresolvedDependency { .. }
                | ResolverEvent::RemovalBlocked { .. },
            ) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Resolver(ResolverEvent::Dequeued { .. })
            | Self::Patch(
                PatchEvent::DownloadStarted { .. }
                | PatchEvent::DownloadCompleted { .. }
                | PatchEvent::PackageVerified { .. }
                | PatchEvent::CachePurged { .. },
            ) => Level::DEBUG,

            _ => Level::INFO,
        }
    }
}
