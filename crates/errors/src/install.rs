//! Installation and removal error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstallError {
    #[error("corrupt archive {path}: {message}")]
    CorruptArchive { path: String, message: String },

    #[error("integrity mismatch for '{member}' in {package}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        package: String,
        member: String,
        expected: String,
        actual: String,
    },

    #[error("package not installed: {package}")]
    NotInstalled { package: String },

    #[error("cannot remove {package}: required by {}", .dependents.join(", "))]
    DependencyConflict {
        package: String,
        dependents: Vec<String>,
    },

    #[error("missing archive for {package}: {path}")]
    MissingArchive { package: String, path: String },

    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("filesystem operation failed: {operation} on {path}: {message}")]
    FilesystemError {
        operation: String,
        path: String,
        message: String,
    },

    #[error("task execution failed: {message}")]
    TaskError { message: String },
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CorruptArchive { .. } | Self::IntegrityMismatch { .. } => {
                Some("The download may be incomplete; run the patch again to retry.")
            }
            Self::DependencyConflict { .. } => {
                Some("Remove the dependent packages first, or pass --force.")
            }
            Self::NotInstalled { .. } => Some("Use `modman list` to see installed packages."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CorruptArchive { .. } | Self::IntegrityMismatch { .. } | Self::TaskError { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CorruptArchive { .. } => "install.corrupt_archive",
            Self::IntegrityMismatch { .. } => "install.integrity_mismatch",
            Self::NotInstalled { .. } => "install.not_installed",
            Self::DependencyConflict { .. } => "install.dependency_conflict",
            Self::MissingArchive { .. } => "install.missing_archive",
            Self::ExtractionFailed { .. } => "install.extraction_failed",
            Self::FilesystemError { .. } => "install.filesystem",
            Self::TaskError { .. } => "install.task",
        };
        Some(code)
    }
}
