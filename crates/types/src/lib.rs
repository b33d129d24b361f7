#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the modman package manager
//!
//! This crate provides the package record shared by every other crate,
//! its lifecycle state machine, dotted versions, and the two JSON wire
//! formats records are parsed from: persisted manifests and remote
//! catalog listing entries.

pub mod listing;
pub mod manifest;
pub mod package;
pub mod state;
pub mod version;

// Re-export commonly used types
pub use listing::{ListingDependency, ListingDownload, ListingEntry, UNIVERSAL_VARIANT};
pub use manifest::{Manifest, ManifestConfig};
pub use package::{AppType, Category, FileEntry, PackageRecord, SourceUrl, LOCAL_SOURCE};
pub use state::{PackageState, StateFlags, Transition};
pub use version::{ParseVersionError, Version};
