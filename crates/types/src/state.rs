//! Package lifecycle state machine
//!
//! A record is in exactly one lifecycle state at a time. Every change goes
//! through [`PackageState::apply`] so that illegal combinations (for example a
//! package that is both queued for install and queued for removal) cannot be
//! represented.

use modman_errors::PackageError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a package record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PackageState {
    /// Known from a catalog but neither installed nor queued
    #[default]
    Untracked,
    /// Queued for download and installation on the next patch
    QueuedInstall,
    /// Installed at the target root with a manifest on disk
    Installed,
    /// Installed, with a newer remote version queued to replace it
    QueuedUpdate,
    /// Installed and queued for removal on the next patch
    QueuedUninstall,
    /// Installed but excluded from tracking
    Ignored,
}

/// Events that move a record between lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// The resolver queued the record for installation
    QueueInstall,
    /// A queued install was withdrawn before patching
    CancelInstall,
    /// The patch extracted the record and persisted its manifest
    CompleteInstall,
    /// Refresh found a newer remote version
    FlagUpdate,
    /// The record was queued for removal
    QueueUninstall,
    /// Re-adding a package cancelled its pending removal
    CancelUninstall,
    /// Refresh matched a remote record against an installed one
    MarkInstalled,
    /// The user asked to stop tracking an installed package
    Ignore,
}

impl PackageState {
    /// Apply a transition, returning the new state
    ///
    /// # Errors
    ///
    /// Returns `PackageError::InvalidTransition` when the transition is not
    /// allowed from the current state.
    pub fn apply(self, transition: Transition, name: &str) -> Result<Self, PackageError> {
        use PackageState::{
            Ignored, Installed, QueuedInstall, QueuedUninstall, QueuedUpdate, Untracked,
        };
        use Transition::{
            CancelInstall, CancelUninstall, CompleteInstall, FlagUpdate, Ignore, MarkInstalled,
            QueueInstall, QueueUninstall,
        };

        let next = match (self, transition) {
            // A remote record may still carry the installed marker from an earlier
            // refresh after its local counterpart has been removed
            (Untracked | Installed, QueueInstall) => Some(QueuedInstall),
            (QueuedInstall, CancelInstall) => Some(Untracked),
            (QueuedInstall, CompleteInstall) => Some(Installed),
            (Installed | QueuedUpdate, FlagUpdate) => Some(QueuedUpdate),
            (Installed | QueuedUpdate | QueuedUninstall, QueueUninstall) => Some(QueuedUninstall),
            (QueuedUninstall, CancelUninstall) => Some(Installed),
            (Untracked | Installed, MarkInstalled) => Some(Installed),
            (Installed | QueuedUpdate | Ignored, Ignore) => Some(Ignored),
            _ => None,
        };

        next.ok_or_else(|| PackageError::InvalidTransition {
            name: name.to_string(),
            from: self.to_string(),
            transition: format!("{transition:?}"),
        })
    }

    /// Whether the package has files at the target root
    #[must_use]
    pub fn is_installed(self) -> bool {
        matches!(
            self,
            Self::Installed | Self::QueuedUpdate | Self::QueuedUninstall | Self::Ignored
        )
    }

    /// Decode the legacy boolean flag set stored in manifests
    #[must_use]
    pub fn from_flags(flags: &StateFlags) -> Self {
        if flags.ignore {
            Self::Ignored
        } else if flags.need_uninstall {
            Self::QueuedUninstall
        } else if flags.need_update {
            Self::QueuedUpdate
        } else if flags.need_install {
            Self::QueuedInstall
        } else if flags.is_local {
            Self::Installed
        } else {
            Self::Untracked
        }
    }

    /// Encode into the boolean flag set stored in manifests
    #[must_use]
    pub fn to_flags(self, is_remote: bool) -> StateFlags {
        let mut flags = StateFlags {
            is_remote,
            is_local: self.is_installed(),
            ..StateFlags::default()
        };
        match self {
            Self::Untracked | Self::Installed => {}
            Self::QueuedInstall => flags.need_install = true,
            Self::QueuedUpdate => flags.need_update = true,
            Self::QueuedUninstall => flags.need_uninstall = true,
            Self::Ignored => flags.ignore = true,
        }
        flags
    }
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Untracked => write!(f, "untracked"),
            Self::QueuedInstall => write!(f, "queued-install"),
            Self::Installed => write!(f, "installed"),
            Self::QueuedUpdate => write!(f, "queued-update"),
            Self::QueuedUninstall => write!(f, "queued-uninstall"),
            Self::Ignored => write!(f, "ignored"),
        }
    }
}

/// Boolean lifecycle flags as they appear in the manifest `config` block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateFlags {
    pub ignore: bool,
    pub is_local: bool,
    pub is_remote: bool,
    pub need_update: bool,
    pub need_install: bool,
    pub need_uninstall: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PackageState; 6] = [
        PackageState::Untracked,
        PackageState::QueuedInstall,
        PackageState::Installed,
        PackageState::QueuedUpdate,
        PackageState::QueuedUninstall,
        PackageState::Ignored,
    ];

    #[test]
    fn test_flags_round_trip_for_every_state() {
        for state in ALL {
            for is_remote in [false, true] {
                let flags = state.to_flags(is_remote);
                assert_eq!(PackageState::from_flags(&flags), state);
                assert_eq!(flags.is_remote, is_remote);
            }
        }
    }

    #[test]
    fn test_install_cycle() {
        let state = PackageState::Untracked
            .apply(Transition::QueueInstall, "x")
            .unwrap()
            .apply(Transition::CompleteInstall, "x")
            .unwrap();
        assert_eq!(state, PackageState::Installed);
    }

    #[test]
    fn test_cancel_uninstall_restores_installed() {
        let state = PackageState::Installed
            .apply(Transition::QueueUninstall, "x")
            .unwrap()
            .apply(Transition::CancelUninstall, "x")
            .unwrap();
        assert_eq!(state, PackageState::Installed);
    }

    #[test]
    fn test_pending_update_can_be_ignored() {
        let state = PackageState::Installed
            .apply(Transition::FlagUpdate, "x")
            .unwrap()
            .apply(Transition::Ignore, "x")
            .unwrap();
        assert_eq!(state, PackageState::Ignored);
        assert!(PackageState::QueuedInstall
            .apply(Transition::Ignore, "x")
            .is_err());
    }

    #[test]
    fn test_rejects_illegal_transitions() {
        assert!(PackageState::Untracked
            .apply(Transition::QueueUninstall, "x")
            .is_err());
        assert!(PackageState::QueuedInstall
            .apply(Transition::FlagUpdate, "x")
            .is_err());
        let err = PackageState::Ignored
            .apply(Transition::CompleteInstall, "SongCore")
            .unwrap_err();
        assert!(err.to_string().contains("SongCore"));
    }

    #[test]
    fn test_legacy_flag_priority() {
        // Older manifests may carry several flags at once; removal wins over update
        let flags = StateFlags {
            is_local: true,
            need_update: true,
            need_uninstall: true,
            ..StateFlags::default()
        };
        assert_eq!(PackageState::from_flags(&flags), PackageState::QueuedUninstall);
    }
}
