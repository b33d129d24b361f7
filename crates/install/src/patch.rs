//! Five-phase patch pipeline
//!
//! Removal, update substitution, download and verification, ordered
//! installation and cache cleanup run in that fixed order. A failure is
//! confined to the package it happened to: it is recorded in the
//! [`PatchReport`], emitted as an event and the batch carries on.

use crate::report::{PackageFailure, PatchReport};
use crate::verify::verify_archive_async;
use futures::stream::{self, StreamExt};
use modman_errors::{Error, InstallError};
use modman_events::{AppEvent, EventEmitter, PatchEvent, PatchPhase};
use modman_net::ArchiveSource;
use modman_resolver::{Catalog, PatchQueue};
use modman_store::{extract_archive, Store};
use modman_types::{Category, PackageRecord, SourceUrl, Transition};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// Default number of concurrent downloads
pub const DEFAULT_PARALLEL_DOWNLOADS: usize = 4;

/// Executes queued removals and installs against one installation root
///
/// The patcher assumes it is the only writer to the root's manifest and
/// cache directories for the duration of [`Patcher::patch`].
#[derive(Clone)]
pub struct Patcher {
    store: Store,
    root: PathBuf,
    archives: Arc<dyn ArchiveSource>,
    parallel_downloads: usize,
}

impl std::fmt::Debug for Patcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Patcher")
            .field("store", &self.store)
            .field("root", &self.root)
            .field("parallel_downloads", &self.parallel_downloads)
            .finish_non_exhaustive()
    }
}

impl Patcher {
    #[must_use]
    pub fn new(store: Store, root: impl Into<PathBuf>, archives: Arc<dyn ArchiveSource>) -> Self {
        Self {
            store,
            root: root.into(),
            archives,
            parallel_downloads: DEFAULT_PARALLEL_DOWNLOADS,
        }
    }

    /// Bound the number of archives fetched at once (minimum 1)
    #[must_use]
    pub fn with_parallel_downloads(mut self, parallel_downloads: usize) -> Self {
        self.parallel_downloads = parallel_downloads.max(1);
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run every queued change
    ///
    /// On return the uninstall and update queues hold only packages whose
    /// removal failed, and the install queue holds only packages whose
    /// download, verification or extraction failed. Those stay
    /// `QueuedInstall` so the next run retries them. Callers should reload
    /// the local catalog from disk afterwards.
    pub async fn patch<E: EventEmitter>(
        &self,
        catalog: &mut Catalog,
        queue: &mut PatchQueue,
        emitter: &E,
    ) -> PatchReport {
        let mut report = PatchReport::default();

        let removed_updates = self.run_removal(catalog, queue, emitter, &mut report).await;
        self.run_substitution(catalog, queue, &removed_updates, emitter, &mut report);

        let install_set = queue.install.clone();
        let ready = self
            .run_download(catalog, &install_set, emitter, &mut report)
            .await;
        self.run_install(catalog, queue, ready, emitter, &mut report)
            .await;
        self.run_cleanup(catalog, queue, emitter, &mut report).await;

        emitter.emit(AppEvent::Patch(PatchEvent::Completed {
            removed: report.removed.len(),
            installed: report.installed.len(),
            failed: report.failures.len(),
        }));
        report
    }

    /// Phase 1: remove files and manifests of uninstalls and pending updates
    ///
    /// Returns the names of updates whose old version is gone.
    async fn run_removal<E: EventEmitter>(
        &self,
        catalog: &mut Catalog,
        queue: &mut PatchQueue,
        emitter: &E,
        report: &mut PatchReport,
    ) -> Vec<String> {
        let updates: HashSet<&String> = queue.update.iter().collect();
        let mut targets: Vec<String> = queue.uninstall.clone();
        for name in &queue.update {
            if !targets.contains(name) {
                targets.push(name.clone());
            }
        }
        let targets: Vec<(String, bool)> = targets
            .into_iter()
            .map(|name| {
                let is_update = updates.contains(&name);
                (name, is_update)
            })
            .collect();

        start_phase(emitter, PatchPhase::Removal, targets.len());
        let mut removed_updates = Vec::new();

        for (name, is_update) in targets {
            let Some(record) = catalog.find_local(&name).cloned() else {
                emitter.emit_debug(format!("{name} is queued for removal but not in the local catalog"));
                PatchQueue::take(&mut queue.uninstall, &name);
                PatchQueue::take(&mut queue.update, &name);
                continue;
            };

            match self.remove_package(&record, emitter).await {
                Ok((files_removed, files_missing)) => {
                    emitter.emit(AppEvent::Patch(PatchEvent::PackageRemoved {
                        package: name.clone(),
                        version: record.version.to_string(),
                        files_removed,
                        files_missing,
                    }));
                    catalog.remove_local(&name);
                    PatchQueue::take(&mut queue.uninstall, &name);
                    if is_update {
                        removed_updates.push(name.clone());
                    }
                    report.removed.push(name);
                }
                Err(e) => record_failure(report, emitter, &name, PatchPhase::Removal, e),
            }
        }

        removed_updates
    }

    /// Delete every recorded file, then the manifest
    ///
    /// Missing or undeletable files are tolerated; the returned pair counts
    /// files deleted and files already gone.
    async fn remove_package<E: EventEmitter>(
        &self,
        record: &PackageRecord,
        emitter: &E,
    ) -> Result<(usize, usize), Error> {
        let mut removed = 0;
        let mut missing = 0;

        for entry in &record.files {
            let Some(path) = path_under(&self.root, &entry.file) else {
                emitter.emit_warning_with_context(
                    format!("refusing to remove {} outside the install root", entry.file),
                    record.name.clone(),
                );
                continue;
            };
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => missing += 1,
                Err(e) => emitter.emit_warning_with_context(
                    format!("could not remove {}: {e}", path.display()),
                    record.name.clone(),
                ),
            }
        }

        self.store.manifests.remove(record).await?;
        Ok((removed, missing))
    }

    /// Phase 2: replace each removed update with its remote record
    fn run_substitution<E: EventEmitter>(
        &self,
        catalog: &mut Catalog,
        queue: &mut PatchQueue,
        removed_updates: &[String],
        emitter: &E,
        report: &mut PatchReport,
    ) {
        start_phase(emitter, PatchPhase::UpdateSubstitution, removed_updates.len());

        for name in removed_updates {
            PatchQueue::take(&mut queue.update, name);

            let Some(remote) = catalog.find_remote(name).cloned() else {
                emitter.emit_warning(format!(
                    "no remote record for {name}; update dropped from this patch"
                ));
                report.dropped_updates.push(name.clone());
                continue;
            };

            let mut replacement = remote;
            replacement.archive_path = None;
            replacement.pulled_in_by = None;
            if let Err(e) = replacement.transition(Transition::QueueInstall) {
                emitter.emit_warning(format!("cannot queue update for {name}: {e}"));
                report.dropped_updates.push(name.clone());
                continue;
            }

            emitter.emit_debug(format!("substituting {replacement} for update of {name}"));
            catalog.upsert_local(replacement);
            PatchQueue::push(&mut queue.install, name);
        }
    }

    /// Phase 3: fetch missing archives into the cache and verify everything
    ///
    /// Returns the names ready for installation, in install-set order.
    async fn run_download<E: EventEmitter>(
        &self,
        catalog: &mut Catalog,
        install_set: &[String],
        emitter: &E,
        report: &mut PatchReport,
    ) -> Vec<String> {
        let jobs: Vec<PackageRecord> = install_set
            .iter()
            .filter_map(|name| catalog.find_local(name).cloned())
            .collect();
        start_phase(emitter, PatchPhase::Download, jobs.len());

        let results: Vec<(String, Result<PathBuf, Error>)> = stream::iter(jobs)
            .map(|record| async move {
                let result = self.fetch_and_verify(&record, emitter).await;
                (record.name, result)
            })
            .buffer_unordered(self.parallel_downloads)
            .collect()
            .await;

        let mut ready: HashSet<String> = HashSet::new();
        for (name, result) in results {
            match result {
                Ok(path) => {
                    if let Some(record) = catalog.find_local_mut(&name) {
                        record.archive_path = Some(path);
                    }
                    ready.insert(name);
                }
                Err(e) => record_failure(report, emitter, &name, PatchPhase::Download, e),
            }
        }

        install_set
            .iter()
            .filter(|name| ready.contains(*name))
            .cloned()
            .collect()
    }

    async fn fetch_and_verify<E: EventEmitter>(
        &self,
        record: &PackageRecord,
        emitter: &E,
    ) -> Result<PathBuf, Error> {
        let path = match (&record.archive_path, &record.source) {
            (Some(path), _) => path.clone(),
            (None, SourceUrl::Local) => {
                return Err(InstallError::MissingArchive {
                    package: record.name.clone(),
                    path: record.source.as_str().to_string(),
                }
                .into());
            }
            (None, SourceUrl::Remote(url)) => {
                emitter.emit(AppEvent::Patch(PatchEvent::DownloadStarted {
                    package: record.name.clone(),
                    url: url.clone(),
                }));
                let bytes = self.archives.fetch_archive(url).await?;
                let path = self.store.cache.store(record, &bytes).await?;
                emitter.emit(AppEvent::Patch(PatchEvent::DownloadCompleted {
                    package: record.name.clone(),
                    bytes: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
                }));
                path
            }
        };

        let verification = verify_archive_async(&path, record).await?;
        for member in &verification.unlisted {
            emitter.emit_warning_with_context(
                format!("{member} has no recorded hash"),
                record.name.clone(),
            );
        }
        emitter.emit(AppEvent::Patch(PatchEvent::PackageVerified {
            package: record.name.clone(),
            files: verification.verified,
            unlisted: verification.unlisted.len(),
        }));
        Ok(path)
    }

    /// Phase 4: extract Core packages first, then everything else
    async fn run_install<E: EventEmitter>(
        &self,
        catalog: &mut Catalog,
        queue: &mut PatchQueue,
        ready: Vec<String>,
        emitter: &E,
        report: &mut PatchReport,
    ) {
        let order = install_order(catalog, ready);
        start_phase(emitter, PatchPhase::Install, order.len());

        for name in order {
            let Some(record) = catalog.find_local(&name).cloned() else {
                continue;
            };
            match self.install_package(record).await {
                Ok(installed) => {
                    emitter.emit(AppEvent::Patch(PatchEvent::PackageInstalled {
                        package: name.clone(),
                        version: installed.version.to_string(),
                        files: installed.files.len(),
                    }));
                    catalog.upsert_local(installed);
                    PatchQueue::take(&mut queue.install, &name);
                    report.installed.push(name);
                }
                Err(e) => record_failure(report, emitter, &name, PatchPhase::Install, e),
            }
        }
    }

    /// Extract the bound archive and persist the manifest
    ///
    /// Members missing from `files` are added so that a later removal
    /// deletes everything that was written.
    async fn install_package(&self, mut record: PackageRecord) -> Result<PackageRecord, Error> {
        let archive = record
            .archive_path
            .clone()
            .ok_or_else(|| InstallError::MissingArchive {
                package: record.name.clone(),
                path: record.archive_file_name(),
            })?;

        let extracted = extract_archive(&archive, &self.root).await?;
        for entry in extracted {
            if !record.files.iter().any(|f| f.file == entry.file) {
                record.files.push(entry);
            }
        }

        record.transition(Transition::CompleteInstall)?;
        record.is_remote = false;
        record.archive_path = None;
        record.pulled_in_by = None;
        self.store.manifests.write(&record).await?;
        Ok(record)
    }

    /// Phase 5: empty the download cache
    ///
    /// Packages left in the install queue lose any binding into the cache so
    /// the next run downloads them again. Imported archives stay bound.
    async fn run_cleanup<E: EventEmitter>(
        &self,
        catalog: &mut Catalog,
        queue: &PatchQueue,
        emitter: &E,
        report: &mut PatchReport,
    ) {
        start_phase(emitter, PatchPhase::Cleanup, 0);
        let cache_dir = self.store.cache.dir();
        for name in &queue.install {
            if let Some(record) = catalog.find_local_mut(name) {
                if record
                    .archive_path
                    .as_deref()
                    .is_some_and(|path| path.starts_with(cache_dir))
                {
                    record.archive_path = None;
                }
            }
        }

        let (purged, failures) = self.store.cache.purge().await;
        for (path, e) in failures {
            emitter.emit_warning_with_context(
                format!("could not purge {}: {e}", path.display()),
                PatchPhase::Cleanup.to_string(),
            );
        }
        emitter.emit(AppEvent::Patch(PatchEvent::CachePurged { archives: purged }));
        report.cache_purged = purged;
    }
}

/// Core packages first, each group sorted by name
fn install_order(catalog: &Catalog, ready: Vec<String>) -> Vec<String> {
    let (mut core, mut rest): (Vec<String>, Vec<String>) =
        ready.into_iter().partition(|name| {
            catalog
                .find_local(name)
                .is_some_and(|r| r.category == Category::Core)
        });
    core.sort();
    rest.sort();
    core.extend(rest);
    core
}

/// Join a recorded relative path onto `root`, rejecting escapes
fn path_under(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    let safe = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    (safe && !relative.as_os_str().is_empty()).then(|| root.join(relative))
}

fn start_phase<E: EventEmitter>(emitter: &E, phase: PatchPhase, packages: usize) {
    emitter.emit(AppEvent::Patch(PatchEvent::PhaseStarted { phase, packages }));
}

fn record_failure<E: EventEmitter>(
    report: &mut PatchReport,
    emitter: &E,
    package: &str,
    phase: PatchPhase,
    error: Error,
) {
    emitter.emit_patch_failure(package, phase, &error);
    report.failures.push(PackageFailure {
        package: package.to_string(),
        phase,
        error,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use modman_types::Version;

    fn record(name: &str, category: Category) -> PackageRecord {
        PackageRecord::new(name, name, Version::new(vec![1, 0, 0]), SourceUrl::Local)
            .with_category(category)
    }

    #[test]
    fn test_install_order_core_first() {
        let catalog = Catalog::new(
            vec![
                record("Zeta", Category::Library),
                record("BSIPA", Category::Core),
                record("Alpha", Category::Gameplay),
                record("SongCore", Category::Core),
            ],
            Vec::new(),
        );
        let ready = vec![
            "Zeta".to_string(),
            "SongCore".to_string(),
            "Alpha".to_string(),
            "BSIPA".to_string(),
        ];
        assert_eq!(
            install_order(&catalog, ready),
            vec!["BSIPA", "SongCore", "Alpha", "Zeta"]
        );
    }

    #[test]
    fn test_path_under_rejects_escapes() {
        let root = Path::new("/game");
        assert_eq!(
            path_under(root, "Plugins/a.dll"),
            Some(PathBuf::from("/game/Plugins/a.dll"))
        );
        assert_eq!(path_under(root, "../etc/passwd"), None);
        assert_eq!(path_under(root, "/etc/passwd"), None);
        assert_eq!(path_under(root, ""), None);
    }
}
