//! Queue manipulation: install, remove, ignore and import

use crate::{OpsCtx, Session};
use modman_errors::{Error, InstallError, OpsError};
use modman_events::EventEmitter;
use modman_resolver::{queue_install, queue_uninstall, PatchQueue, Removal, Resolution};
use modman_store::{record_from_archive, ImportOrigin};
use modman_types::{PackageState, Transition};
use std::path::Path;

/// Queue a package and its dependencies for installation
///
/// The name is looked up in the remote catalog, falling back to the local
/// catalog so that re-adding a package queued for removal cancels it.
///
/// # Errors
///
/// Returns `OpsError::PackageNotFound` if neither catalog knows the name.
pub fn install(ctx: &OpsCtx, session: &mut Session, name: &str) -> Result<Resolution, Error> {
    let record = session
        .catalog
        .find_remote(name)
        .or_else(|| session.catalog.find_local(name))
        .cloned()
        .ok_or_else(|| OpsError::PackageNotFound {
            package: name.to_string(),
        })?;

    queue_install(&mut session.catalog, &mut session.queue, record, ctx)
}

/// Queue an installed package for removal
///
/// # Errors
///
/// Returns `InstallError::NotInstalled` if the package is not installed and
/// `InstallError::DependencyConflict` if other installed packages depend on
/// it and `force` is not set.
pub fn uninstall(
    ctx: &OpsCtx,
    session: &mut Session,
    name: &str,
    force: bool,
) -> Result<Removal, Error> {
    queue_uninstall(&mut session.catalog, &mut session.queue, name, force, ctx)
}

/// Stop tracking an installed package
///
/// The manifest is rewritten with the ignore flag and the record leaves the
/// local catalog; its files stay on disk.
///
/// # Errors
///
/// Returns `InstallError::NotInstalled` if the package is not installed, or
/// an error if the manifest cannot be written.
pub async fn ignore_package(ctx: &OpsCtx, session: &mut Session, name: &str) -> Result<(), Error> {
    let mut record = session
        .catalog
        .find_local(name)
        .filter(|r| matches!(r.state, PackageState::Installed | PackageState::QueuedUpdate))
        .cloned()
        .ok_or_else(|| InstallError::NotInstalled {
            package: name.to_string(),
        })?;

    record.transition(Transition::Ignore)?;
    ctx.store.manifests.write(&record).await?;

    session.catalog.remove_local(name);
    PatchQueue::take(&mut session.queue.update, name);
    ctx.emit_debug(format!("{record} is now ignored"));
    Ok(())
}

/// Queue a standalone archive for installation
///
/// When the remote catalog has the same package at the same version, the
/// remote record is queued but bound to the imported archive so nothing is
/// downloaded.
///
/// # Errors
///
/// Returns an error if the archive cannot be read.
pub async fn import_archive(
    ctx: &OpsCtx,
    session: &mut Session,
    path: &Path,
) -> Result<(Resolution, ImportOrigin), Error> {
    let (record, origin) = record_from_archive(path, ctx.config.general.app_type).await?;
    ctx.emit_debug(format!("imported {record} from {} ({origin:?})", path.display()));

    let name = record.name.clone();
    let version = record.version.clone();
    let archive = record.archive_path.clone();
    let resolution = queue_install(&mut session.catalog, &mut session.queue, record, ctx)?;

    if let Some(queued) = session.catalog.find_local_mut(&name) {
        if queued.state == PackageState::QueuedInstall
            && queued.archive_path.is_none()
            && queued.version == version
        {
            queued.archive_path = archive;
        }
    }

    Ok((resolution, origin))
}
