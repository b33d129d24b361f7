#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Dependency resolution for modman
//!
//! Resolution is existence-only: a dependency is a package name, satisfied
//! by any installed or queued record with that name. Version numbers are
//! compared only to detect that a newer remote release exists.

mod catalog;
mod queue;
mod resolve;

pub use catalog::Catalog;
pub use queue::PatchQueue;
pub use resolve::{check_updates, queue_install, queue_uninstall, Removal, Resolution};
