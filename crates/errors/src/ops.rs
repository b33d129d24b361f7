//! Operation orchestration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpsError {
    #[error("package not found in remote catalog: {package}")]
    PackageNotFound { package: String },

    #[error("package not found in local catalog: {package}")]
    NotInLocalCatalog { package: String },

    #[error("context creation failed: {message}")]
    ContextCreationFailed { message: String },

    #[error("component not found: {component}")]
    MissingComponent { component: String },

    #[error("operation cancelled by user")]
    Cancelled,
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::PackageNotFound { .. } => Some("Use `modman search` to find available packages."),
            Self::NotInLocalCatalog { .. } => Some("Use `modman list` to see installed packages."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::PackageNotFound { .. } => "ops.package_not_found",
            Self::NotInLocalCatalog { .. } => "ops.not_in_local_catalog",
            Self::ContextCreationFailed { .. } => "ops.context_creation_failed",
            Self::MissingComponent { .. } => "ops.missing_component",
            Self::Cancelled => "ops.cancelled",
        };
        Some(code)
    }
}
