//! Package-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PackageError {
    #[error("package not found: {name}")]
    NotFound { name: String },

    #[error("no download for platform '{platform}' or 'universal' in listing for {name}")]
    NoCompatibleVariant { name: String, platform: String },

    #[error("failed to parse manifest {path}: {message}")]
    ManifestParse { path: String, message: String },

    #[error("invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("invalid listing entry: {message}")]
    InvalidListing { message: String },

    #[error("invalid state transition for {name}: {transition} from {from}")]
    InvalidTransition {
        name: String,
        from: String,
        transition: String,
    },
}

impl UserFacingError for PackageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Search the catalog to check the exact package name."),
            Self::NoCompatibleVariant { .. } => {
                Some("Check the configured application type (e.g. steam or oculus).")
            }
            Self::ManifestParse { .. } => {
                Some("Remove the damaged manifest from the meta directory and reinstall the package.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "package.not_found",
            Self::NoCompatibleVariant { .. } => "package.no_compatible_variant",
            Self::ManifestParse { .. } => "package.manifest_parse",
            Self::InvalidManifest { .. } => "package.invalid_manifest",
            Self::InvalidListing { .. } => "package.invalid_listing",
            Self::InvalidTransition { .. } => "package.invalid_transition",
        };
        Some(code)
    }
}
