#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations for modman
//!
//! Every operation takes an [`OpsCtx`] carrying configuration, storage and
//! collaborators, plus a [`Session`] holding the in-memory catalogs and
//! pending queues. Nothing here keeps process-wide state.

mod catalog;
mod context;
mod patch;
mod query;
mod queue;
mod types;

pub use catalog::{load_local, load_remote, load_remote_query, refresh};
pub use context::{OpsContextBuilder, OpsCtx, Session};
pub use patch::{clean_reinstall, patch, plan};
pub use query::{list, search};
pub use queue::{ignore_package, import_archive, install, uninstall};
pub use types::{PackageInfo, RefreshSummary, ReinstallReport};

pub use modman_install::{PackageFailure, PatchPlan, PatchReport};
pub use modman_net::CatalogQuery;
pub use modman_resolver::{Removal, Resolution};
pub use modman_store::ImportOrigin;
