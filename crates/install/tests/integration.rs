//! Integration tests for install crate

#[cfg(test)]
mod tests {
    use modman_config::InstallPaths;
    use modman_errors::{Error, InstallError};
    use modman_events::{channel, AppEvent, EventReceiver, NullEmitter, PatchEvent, PatchPhase};
    use modman_hash::ContentHash;
    use modman_install::*;
    use modman_net::MemorySource;
    use modman_resolver::{check_updates, queue_install, Catalog, PatchQueue};
    use modman_store::Store;
    use modman_types::{Category, FileEntry, PackageRecord, PackageState, SourceUrl, Transition};
    use std::io::{Cursor, Write};
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn zip_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, data) in members {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn entries(members: &[(&str, &[u8])]) -> Vec<FileEntry> {
        members
            .iter()
            .map(|(name, data)| FileEntry::new(*name, ContentHash::from_data(data).to_hex()))
            .collect()
    }

    fn url(name: &str, version: &str) -> String {
        format!("/uploads/{name}-{version}.zip")
    }

    fn remote(
        name: &str,
        version: &str,
        category: Category,
        deps: &[&str],
        members: &[(&str, &[u8])],
    ) -> PackageRecord {
        let mut record = PackageRecord::new(
            format!("remote-{name}"),
            name,
            version.parse().unwrap(),
            SourceUrl::Remote(url(name, version)),
        )
        .with_category(category)
        .with_dependencies(deps.iter().copied())
        .with_files(entries(members));
        record.is_remote = true;
        record
    }

    struct Fixture {
        temp: TempDir,
        paths: InstallPaths,
        store: Store,
    }

    impl Fixture {
        async fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let paths = InstallPaths::new(temp.path());
            paths.ensure().await.unwrap();
            let store = Store::new(&paths);
            Self { temp, paths, store }
        }

        fn root(&self) -> &Path {
            self.temp.path()
        }

        fn patcher(&self, source: Arc<MemorySource>) -> Patcher {
            Patcher::new(self.store.clone(), self.paths.root(), source).with_parallel_downloads(2)
        }
    }

    fn drain(rx: &mut EventReceiver) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(message) = rx.try_recv() {
            events.push(message.event);
        }
        events
    }

    const X_FILES: &[(&str, &[u8])] = &[("Plugins/X.dll", b"x-v1"), ("Libs/XHelper.dll", b"help")];

    #[tokio::test]
    async fn test_fresh_install_writes_files_and_manifest() {
        let fx = Fixture::new().await;
        let x = remote("X", "1.0.0", Category::Gameplay, &[], X_FILES);
        let source =
            Arc::new(MemorySource::new().with_archive(url("X", "1.0.0"), zip_bytes(X_FILES)));

        let mut catalog = Catalog::new(Vec::new(), vec![x.clone()]);
        let mut queue = PatchQueue::new();
        queue_install(&mut catalog, &mut queue, x, &NullEmitter).unwrap();

        let report = fx
            .patcher(source)
            .patch(&mut catalog, &mut queue, &NullEmitter)
            .await;

        assert!(report.is_success(), "{:?}", report.failures);
        assert_eq!(report.installed, vec!["X"]);
        assert!(queue.is_empty());
        assert_eq!(
            std::fs::read(fx.root().join("Plugins/X.dll")).unwrap(),
            b"x-v1"
        );
        assert!(fx.root().join("Libs/XHelper.dll").exists());

        let scan = fx.store.manifests.scan().await.unwrap();
        assert_eq!(scan.manifests.len(), 1);
        let (path, manifest) = &scan.manifests[0];
        assert!(path.ends_with("X_1.0.0.json"));
        assert!(manifest.config.is_local);
        assert!(!manifest.config.is_remote);
        assert!(!manifest.config.need_install);

        let local = catalog.find_local("X").unwrap();
        assert_eq!(local.state, PackageState::Installed);
        assert!(local.archive_path.is_none());
    }

    #[tokio::test]
    async fn test_core_installed_before_dependents() {
        let fx = Fixture::new().await;
        let core_files: &[(&str, &[u8])] = &[("Plugins/C.dll", b"core")];
        let lib_files: &[(&str, &[u8])] = &[("Libs/L.dll", b"lib")];
        let c = remote("C", "1.0.0", Category::Core, &[], core_files);
        let l = remote("A-Lib", "1.0.0", Category::Library, &["C"], lib_files);
        let source = Arc::new(
            MemorySource::new()
                .with_archive(url("C", "1.0.0"), zip_bytes(core_files))
                .with_archive(url("A-Lib", "1.0.0"), zip_bytes(lib_files)),
        );

        let mut catalog = Catalog::new(Vec::new(), vec![c, l.clone()]);
        let mut queue = PatchQueue::new();
        queue_install(&mut catalog, &mut queue, l, &NullEmitter).unwrap();
        assert_eq!(queue.install.len(), 2);

        let (tx, mut rx) = channel();
        let report = fx.patcher(source).patch(&mut catalog, &mut queue, &tx).await;

        assert!(report.is_success());
        assert_eq!(report.installed, vec!["C", "A-Lib"]);
        let installed: Vec<String> = drain(&mut rx)
            .into_iter()
            .filter_map(|event| match event {
                AppEvent::Patch(PatchEvent::PackageInstalled { package, .. }) => Some(package),
                _ => None,
            })
            .collect();
        assert_eq!(installed, vec!["C", "A-Lib"]);
    }

    #[tokio::test]
    async fn test_update_replaces_old_version() {
        let fx = Fixture::new().await;
        let old_files: &[(&str, &[u8])] = &[("Plugins/X.dll", b"x-v1"), ("Plugins/Old.dll", b"old")];
        let new_files: &[(&str, &[u8])] = &[("Plugins/X.dll", b"x-v2")];

        let mut installed = remote("X", "1.0.0", Category::Gameplay, &[], old_files);
        installed.is_remote = false;
        installed.transition(Transition::MarkInstalled).unwrap();
        std::fs::create_dir_all(fx.root().join("Plugins")).unwrap();
        for (name, data) in old_files {
            std::fs::write(fx.root().join(name), data).unwrap();
        }
        fx.store.manifests.write(&installed).await.unwrap();

        let newer = remote("X", "1.1.0", Category::Gameplay, &[], new_files);
        let source =
            Arc::new(MemorySource::new().with_archive(url("X", "1.1.0"), zip_bytes(new_files)));

        let mut catalog = Catalog::new(vec![installed], vec![newer]);
        let mut queue = PatchQueue::new();
        let flagged = check_updates(&mut catalog, &mut queue, true, &NullEmitter).unwrap();
        assert_eq!(flagged, vec!["X"]);
        assert_eq!(catalog.find_local("X").unwrap().state, PackageState::QueuedUpdate);

        let plan = PatchPlan::from_queue(&catalog, &queue);
        assert_eq!(plan.remove.len(), 1);
        assert_eq!(plan.install[0].replaces, Some("1.0.0".parse().unwrap()));

        let report = fx
            .patcher(source)
            .patch(&mut catalog, &mut queue, &NullEmitter)
            .await;

        assert!(report.is_success(), "{:?}", report.failures);
        assert_eq!(report.removed, vec!["X"]);
        assert_eq!(report.installed, vec!["X"]);
        assert!(!fx.root().join("Plugins/Old.dll").exists());
        assert_eq!(
            std::fs::read(fx.root().join("Plugins/X.dll")).unwrap(),
            b"x-v2"
        );

        let scan = fx.store.manifests.scan().await.unwrap();
        assert_eq!(scan.manifests.len(), 1);
        assert!(scan.manifests[0].0.ends_with("X_1.1.0.json"));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_update_without_remote_is_dropped() {
        let fx = Fixture::new().await;
        let files: &[(&str, &[u8])] = &[("Plugins/X.dll", b"x-v1")];
        let mut installed = remote("X", "1.0.0", Category::Gameplay, &[], files);
        installed.transition(Transition::MarkInstalled).unwrap();
        installed.transition(Transition::FlagUpdate).unwrap();
        fx.store.manifests.write(&installed).await.unwrap();

        let mut catalog = Catalog::new(vec![installed], Vec::new());
        let mut queue = PatchQueue::new();
        PatchQueue::push(&mut queue.update, "X");

        let report = fx
            .patcher(Arc::new(MemorySource::new()))
            .patch(&mut catalog, &mut queue, &NullEmitter)
            .await;

        assert_eq!(report.removed, vec!["X"]);
        assert_eq!(report.dropped_updates, vec!["X"]);
        assert!(report.installed.is_empty());
        assert!(queue.is_empty());
        assert!(catalog.find_local("X").is_none());
    }

    #[tokio::test]
    async fn test_download_failure_is_isolated_and_retried() {
        let fx = Fixture::new().await;
        let x_files: &[(&str, &[u8])] = &[("Plugins/X.dll", b"x")];
        let y_files: &[(&str, &[u8])] = &[("Plugins/Y.dll", b"y")];
        let x = remote("X", "1.0.0", Category::Gameplay, &[], x_files);
        let y = remote("Y", "1.0.0", Category::Gameplay, &[], y_files);
        let source = Arc::new(
            MemorySource::new()
                .with_archive(url("X", "1.0.0"), zip_bytes(x_files))
                .with_archive(url("Y", "1.0.0"), zip_bytes(y_files)),
        );
        source.fail(url("Y", "1.0.0"));

        let mut catalog = Catalog::new(Vec::new(), vec![x.clone(), y.clone()]);
        let mut queue = PatchQueue::new();
        queue_install(&mut catalog, &mut queue, x, &NullEmitter).unwrap();
        queue_install(&mut catalog, &mut queue, y, &NullEmitter).unwrap();

        let patcher = fx.patcher(source.clone());
        let report = patcher.patch(&mut catalog, &mut queue, &NullEmitter).await;

        assert_eq!(report.installed, vec!["X"]);
        assert_eq!(report.failed_in(PatchPhase::Download), vec!["Y"]);
        assert!(!fx.root().join("Plugins/Y.dll").exists());
        assert_eq!(queue.install, vec!["Y"]);
        assert_eq!(
            catalog.find_local("Y").unwrap().state,
            PackageState::QueuedInstall
        );

        source.restore(&url("Y", "1.0.0"));
        let retry = patcher.patch(&mut catalog, &mut queue, &NullEmitter).await;
        assert!(retry.is_success());
        assert_eq!(retry.installed, vec!["Y"]);
        assert!(fx.root().join("Plugins/Y.dll").exists());
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_extraction_failure_is_downloaded_again_on_retry() {
        let fx = Fixture::new().await;
        let x_files: &[(&str, &[u8])] = &[("Plugins/X.dll", b"x")];
        let x = remote("X", "1.0.0", Category::Gameplay, &[], x_files);
        let source =
            Arc::new(MemorySource::new().with_archive(url("X", "1.0.0"), zip_bytes(x_files)));

        // a plain file where the archive needs a directory
        let blocker = fx.root().join("Plugins");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let mut catalog = Catalog::new(Vec::new(), vec![x.clone()]);
        let mut queue = PatchQueue::new();
        queue_install(&mut catalog, &mut queue, x, &NullEmitter).unwrap();

        let patcher = fx.patcher(source.clone());
        let report = patcher.patch(&mut catalog, &mut queue, &NullEmitter).await;
        assert_eq!(report.failed_in(PatchPhase::Install), vec!["X"]);
        assert_eq!(queue.install, vec!["X"]);
        let pending = catalog.find_local("X").unwrap();
        assert_eq!(pending.state, PackageState::QueuedInstall);
        assert!(pending.archive_path.is_none());

        std::fs::remove_file(&blocker).unwrap();
        let retry = patcher.patch(&mut catalog, &mut queue, &NullEmitter).await;
        assert!(retry.is_success(), "{:?}", retry.failures);
        assert_eq!(retry.installed, vec!["X"]);
        assert_eq!(std::fs::read(fx.root().join("Plugins/X.dll")).unwrap(), b"x");
        assert_eq!(source.fetched().len(), 2);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_integrity_mismatch_blocks_install() {
        let fx = Fixture::new().await;
        let listed: &[(&str, &[u8])] = &[("Plugins/X.dll", b"expected")];
        let served: &[(&str, &[u8])] = &[("Plugins/X.dll", b"tampered")];
        let x = remote("X", "1.0.0", Category::Gameplay, &[], listed);
        let source =
            Arc::new(MemorySource::new().with_archive(url("X", "1.0.0"), zip_bytes(served)));

        let mut catalog = Catalog::new(Vec::new(), vec![x.clone()]);
        let mut queue = PatchQueue::new();
        queue_install(&mut catalog, &mut queue, x, &NullEmitter).unwrap();

        let (tx, mut rx) = channel();
        let report = fx.patcher(source).patch(&mut catalog, &mut queue, &tx).await;

        assert!(report.installed.is_empty());
        assert!(matches!(
            report.failures[0].error,
            Error::Install(InstallError::IntegrityMismatch { .. })
        ));
        assert!(!fx.root().join("Plugins/X.dll").exists());
        assert!(drain(&mut rx).iter().any(|event| matches!(
            event,
            AppEvent::Patch(PatchEvent::PackageFailed { phase: PatchPhase::Download, .. })
        )));
    }

    #[tokio::test]
    async fn test_uninstall_tolerates_missing_files_and_purges_cache() {
        let fx = Fixture::new().await;
        let files: &[(&str, &[u8])] = &[("Plugins/X.dll", b"x"), ("Plugins/Gone.dll", b"gone")];
        let mut installed = remote("X", "1.0.0", Category::Gameplay, &[], files);
        installed.transition(Transition::MarkInstalled).unwrap();
        installed.transition(Transition::QueueUninstall).unwrap();
        std::fs::create_dir_all(fx.root().join("Plugins")).unwrap();
        std::fs::write(fx.root().join("Plugins/X.dll"), b"x").unwrap();
        fx.store.manifests.write(&installed).await.unwrap();
        std::fs::write(fx.paths.cache_dir.join("stale.zip"), b"stale").unwrap();

        let mut catalog = Catalog::new(vec![installed], Vec::new());
        let mut queue = PatchQueue::new();
        PatchQueue::push(&mut queue.uninstall, "X");

        let (tx, mut rx) = channel();
        let report = fx
            .patcher(Arc::new(MemorySource::new()))
            .patch(&mut catalog, &mut queue, &tx)
            .await;

        assert!(report.is_success());
        assert_eq!(report.removed, vec!["X"]);
        assert_eq!(report.cache_purged, 1);
        assert!(!fx.root().join("Plugins/X.dll").exists());
        assert!(fx.store.manifests.scan().await.unwrap().manifests.is_empty());
        assert!(catalog.local().is_empty());

        let events = drain(&mut rx);
        let removed = events.iter().find_map(|event| match event {
            AppEvent::Patch(PatchEvent::PackageRemoved {
                files_removed,
                files_missing,
                ..
            }) => Some((*files_removed, *files_missing)),
            _ => None,
        });
        assert_eq!(removed, Some((1, 1)));
        assert!(events.iter().any(|event| matches!(
            event,
            AppEvent::Patch(PatchEvent::CachePurged { archives: 1 })
        )));
    }

    #[tokio::test]
    async fn test_local_record_without_archive_fails() {
        let fx = Fixture::new().await;
        let orphan = PackageRecord::new("id", "Orphan", "1.0.0".parse().unwrap(), SourceUrl::Local);

        let mut catalog = Catalog::new(Vec::new(), Vec::new());
        let mut queue = PatchQueue::new();
        queue_install(&mut catalog, &mut queue, orphan, &NullEmitter).unwrap();

        let report = fx
            .patcher(Arc::new(MemorySource::new()))
            .patch(&mut catalog, &mut queue, &NullEmitter)
            .await;

        assert!(matches!(
            report.failures[0].error,
            Error::Install(InstallError::MissingArchive { .. })
        ));
        assert_eq!(queue.install, vec!["Orphan"]);
    }

    #[tokio::test]
    async fn test_verify_tolerates_unlisted_members() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("x.zip");
        let members: &[(&str, &[u8])] = &[("Plugins/X.dll", b"x"), ("README.txt", b"hi")];
        std::fs::write(&path, zip_bytes(members)).unwrap();

        let record = remote("X", "1.0.0", Category::Other, &[], &members[..1]);
        let verification = verify_archive(&path, &record).unwrap();
        assert_eq!(verification.verified, 1);
        assert_eq!(verification.unlisted, vec!["README.txt"]);

        let mut upper = record.clone();
        upper.files[0].hash = upper.files[0].hash.to_uppercase();
        assert!(verify_archive_async(&path, &upper).await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_rejects_corrupt_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.zip");
        std::fs::write(&path, b"PK\x03\x04 truncated").unwrap();

        let record = remote("X", "1.0.0", Category::Other, &[], &[]);
        assert!(matches!(
            verify_archive(&path, &record),
            Err(Error::Install(InstallError::CorruptArchive { .. }))
        ));
    }

    #[test]
    fn test_plan_lists_queued_changes() {
        let mut gone = remote("Gone", "2.0.0", Category::Other, &[], &[]);
        gone.transition(Transition::MarkInstalled).unwrap();
        gone.transition(Transition::QueueUninstall).unwrap();
        let fresh = remote("Fresh", "1.0.0", Category::Other, &[], &[]);

        let mut catalog = Catalog::new(vec![gone], vec![fresh.clone()]);
        let mut queue = PatchQueue::new();
        PatchQueue::push(&mut queue.uninstall, "Gone");
        queue_install(&mut catalog, &mut queue, fresh, &NullEmitter).unwrap();

        let plan = PatchPlan::from_queue(&catalog, &queue);
        assert!(!plan.is_empty());
        let rendered = plan.to_string();
        assert!(rendered.contains("- Gone 2.0.0"));
        assert!(rendered.contains("+ Fresh 1.0.0"));
        assert!(PatchPlan::from_queue(&catalog, &PatchQueue::new()).is_empty());
    }
}
