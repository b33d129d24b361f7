//! Install closure expansion and removal validation

use crate::{Catalog, PatchQueue};
use modman_errors::{Error, InstallError};
use modman_events::{AppEvent, CatalogEvent, EventEmitter, QueueKind, ResolverEvent};
use modman_types::{PackageRecord, PackageState, Transition};
use std::collections::HashSet;

/// What a call to [`queue_install`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Names newly queued for install, requested package first
    pub queued: Vec<String>,
    /// Names whose pending removal was cancelled instead
    pub uninstall_cancelled: Vec<String>,
    /// Queued names with no remote counterpart
    pub local_only: Vec<String>,
    /// `(package, dependency)` pairs that could not be found anywhere
    pub unresolved: Vec<(String, String)>,
}

impl Resolution {
    /// Nothing was queued or cancelled
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.queued.is_empty() && self.uninstall_cancelled.is_empty()
    }
}

/// Outcome of [`queue_uninstall`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The package was only queued for install; that was withdrawn
    InstallCancelled,
    /// The package is now queued for removal
    Queued,
    /// It was already queued for removal
    AlreadyQueued,
}

/// Queue `record` and its dependency closure for installation
///
/// Idempotent: a name already present in the local catalog is never queued
/// again. Re-adding a package that is queued for removal cancels the removal.
/// A remote record with the same name is preferred over `record`. Missing
/// dependencies are reported and skipped.
///
/// # Errors
///
/// Returns an error only if a record is in a state that cannot be queued.
pub fn queue_install<E: EventEmitter>(
    catalog: &mut Catalog,
    queue: &mut PatchQueue,
    record: PackageRecord,
    emitter: &E,
) -> Result<Resolution, Error> {
    let mut resolution = Resolution::default();
    let mut visited = HashSet::new();
    resolve(
        catalog,
        queue,
        record,
        None,
        &mut visited,
        &mut resolution,
        emitter,
    )?;
    Ok(resolution)
}

fn resolve<E: EventEmitter>(
    catalog: &mut Catalog,
    queue: &mut PatchQueue,
    record: PackageRecord,
    pulled_in_by: Option<&str>,
    visited: &mut HashSet<String>,
    resolution: &mut Resolution,
    emitter: &E,
) -> Result<(), Error> {
    // a name seen earlier in this call is satisfied, whatever its state
    if !visited.insert(record.name.clone()) {
        return Ok(());
    }

    if let Some(local) = catalog.find_local_mut(&record.name) {
        if local.state == PackageState::QueuedUninstall {
            local.transition(Transition::CancelUninstall)?;
            PatchQueue::take(&mut queue.uninstall, &record.name);
            resolution.uninstall_cancelled.push(record.name.clone());
            emitter.emit(AppEvent::Resolver(ResolverEvent::Dequeued {
                package: record.name.clone(),
                queue: QueueKind::Uninstall,
            }));
        }
        return Ok(());
    }

    let mut chosen = if let Some(remote) = catalog.find_remote(&record.name) {
        remote.clone()
    } else {
        resolution.local_only.push(record.name.clone());
        emitter.emit(AppEvent::Resolver(ResolverEvent::LocalOnly {
            package: record.name.clone(),
        }));
        record
    };

    chosen.pulled_in_by = pulled_in_by.map(str::to_string);
    chosen.transition(Transition::QueueInstall)?;
    emitter.emit_queued(&chosen, QueueKind::Install);

    let name = chosen.name.clone();
    let dependencies = chosen.dependencies.clone();
    PatchQueue::push(&mut queue.install, &name);
    catalog.upsert_local(chosen);
    resolution.queued.push(name.clone());

    for dependency in dependencies {
        if catalog.find_local(&dependency).is_some() {
            continue;
        }
        match catalog.find_remote(&dependency).cloned() {
            Some(remote) => resolve(
                catalog,
                queue,
                remote,
                Some(&name),
                visited,
                resolution,
                emitter,
            )?,
            None => {
                emitter.emit(AppEvent::Resolver(ResolverEvent::UnresolvedDependency {
                    package: name.clone(),
                    dependency: dependency.clone(),
                }));
                resolution.unresolved.push((name.clone(), dependency));
            }
        }
    }

    Ok(())
}

/// Queue an installed package for removal
///
/// A package that is only queued for install is simply withdrawn. Without
/// `force`, removal is refused while another local record depends on the
/// package; dependents that are themselves queued for removal do not count.
///
/// # Errors
///
/// Returns `InstallError::NotInstalled` if the package is not in the local
/// catalog, and `InstallError::DependencyConflict` naming every dependent.
pub fn queue_uninstall<E: EventEmitter>(
    catalog: &mut Catalog,
    queue: &mut PatchQueue,
    name: &str,
    force: bool,
    emitter: &E,
) -> Result<Removal, Error> {
    let state = catalog
        .find_local(name)
        .map(|r| r.state)
        .ok_or_else(|| InstallError::NotInstalled {
            package: name.to_string(),
        })?;

    match state {
        PackageState::QueuedInstall => {
            catalog.remove_local(name);
            PatchQueue::take(&mut queue.install, name);
            emitter.emit(AppEvent::Resolver(ResolverEvent::Dequeued {
                package: name.to_string(),
                queue: QueueKind::Install,
            }));
            return Ok(Removal::InstallCancelled);
        }
        PackageState::QueuedUninstall => return Ok(Removal::AlreadyQueued),
        PackageState::Untracked | PackageState::Ignored => {
            return Err(InstallError::NotInstalled {
                package: name.to_string(),
            }
            .into());
        }
        PackageState::Installed | PackageState::QueuedUpdate => {}
    }

    let dependents = catalog.local_dependents(name);

    if !dependents.is_empty() && !force {
        emitter.emit(AppEvent::Resolver(ResolverEvent::RemovalBlocked {
            package: name.to_string(),
            dependents: dependents.clone(),
        }));
        return Err(InstallError::DependencyConflict {
            package: name.to_string(),
            dependents,
        }
        .into());
    }

    PatchQueue::take(&mut queue.update, name);
    if let Some(record) = catalog.find_local_mut(name) {
        record.transition(Transition::QueueUninstall)?;
        emitter.emit_queued(record, QueueKind::Uninstall);
    }
    PatchQueue::push(&mut queue.uninstall, name);
    Ok(Removal::Queued)
}

/// Match installed records against the remote catalog
///
/// Every remote record with an installed counterpart is marked installed.
/// When `flag_updates` is set, an installed record whose remote version is
/// strictly newer is flagged and added to the update queue. Returns the
/// names flagged for update.
///
/// # Errors
///
/// Returns an error if a record is in a state that cannot be flagged.
pub fn check_updates<E: EventEmitter>(
    catalog: &mut Catalog,
    queue: &mut PatchQueue,
    flag_updates: bool,
    emitter: &E,
) -> Result<Vec<String>, Error> {
    let installed: Vec<(String, PackageState)> = catalog
        .local()
        .iter()
        .map(|r| (r.name.clone(), r.state))
        .collect();

    let mut flagged = Vec::new();
    for (name, state) in installed {
        let Some(remote) = catalog.find_remote_mut(&name) else {
            continue;
        };
        if remote.state == PackageState::Untracked && state.is_installed() {
            remote.transition(Transition::MarkInstalled)?;
        }
        let available = remote.version.clone();

        if !flag_updates || state != PackageState::Installed {
            continue;
        }
        let Some(local) = catalog.find_local_mut(&name) else {
            continue;
        };
        if available > local.version {
            local.transition(Transition::FlagUpdate)?;
            emitter.emit(AppEvent::Catalog(CatalogEvent::UpdateAvailable {
                package: name.clone(),
                installed: local.version.to_string(),
                available: available.to_string(),
            }));
            emitter.emit_queued(local, QueueKind::Update);
            PatchQueue::push(&mut queue.update, &name);
            flagged.push(name);
        }
    }

    Ok(flagged)
}
