#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Archive verification and the patch pipeline for modman
//!
//! [`Patcher::patch`] consumes the queues built by the resolver and applies
//! them to the installation root. [`PatchPlan`] previews the same queues
//! without touching disk.

mod patch;
mod plan;
mod report;
mod verify;

pub use patch::{Patcher, DEFAULT_PARALLEL_DOWNLOADS};
pub use plan::{PatchPlan, PlannedChange};
pub use report::{PackageFailure, PatchReport};
pub use verify::{verify_archive, verify_archive_async, Verification};
