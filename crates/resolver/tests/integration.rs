//! Integration tests for resolver crate

#[cfg(test)]
mod tests {
    use modman_errors::{Error, InstallError};
    use modman_events::{channel, AppEvent, EventReceiver, NullEmitter, ResolverEvent};
    use modman_resolver::*;
    use modman_types::{Category, PackageRecord, PackageState, SourceUrl, Transition};
    use proptest::prelude::*;

    fn remote(name: &str, version: &str, deps: &[&str]) -> PackageRecord {
        let mut record = PackageRecord::new(
            format!("remote-{name}"),
            name,
            version.parse().unwrap(),
            SourceUrl::Remote(format!("/uploads/{name}.zip")),
        )
        .with_dependencies(deps.iter().copied());
        record.is_remote = true;
        record
    }

    fn installed(name: &str, version: &str, deps: &[&str]) -> PackageRecord {
        let mut record = PackageRecord::new(
            format!("local-{name}"),
            name,
            version.parse().unwrap(),
            SourceUrl::Remote(format!("/uploads/{name}.zip")),
        )
        .with_dependencies(deps.iter().copied());
        record.transition(Transition::MarkInstalled).unwrap();
        record
    }

    fn drain(rx: &mut EventReceiver) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(message) = rx.try_recv() {
            events.push(message.event);
        }
        events
    }

    #[test]
    fn test_closure_queues_dependencies() {
        let mut catalog = Catalog::new(
            Vec::new(),
            vec![
                remote("C", "1.0.0", &[]).with_category(Category::Core),
                remote("L", "1.0.0", &["C"]).with_category(Category::Library),
            ],
        );
        let mut queue = PatchQueue::new();
        let request = catalog.find_remote("L").cloned().unwrap();

        let resolution = queue_install(&mut catalog, &mut queue, request, &NullEmitter).unwrap();

        assert_eq!(resolution.queued, ["L", "C"]);
        assert_eq!(queue.install, ["L", "C"]);
        let core = catalog.find_local("C").unwrap();
        assert_eq!(core.state, PackageState::QueuedInstall);
        assert_eq!(core.pulled_in_by.as_deref(), Some("L"));
        // remote catalog is untouched
        assert_eq!(
            catalog.find_remote("C").unwrap().state,
            PackageState::Untracked
        );
    }

    #[test]
    fn test_queue_install_is_idempotent() {
        let mut catalog = Catalog::new(Vec::new(), vec![remote("X", "1.0.0", &[])]);
        let mut queue = PatchQueue::new();
        let request = catalog.find_remote("X").cloned().unwrap();

        queue_install(&mut catalog, &mut queue, request.clone(), &NullEmitter).unwrap();
        let second = queue_install(&mut catalog, &mut queue, request, &NullEmitter).unwrap();

        assert!(second.is_noop());
        assert_eq!(queue.install, ["X"]);
        assert_eq!(catalog.local().len(), 1);
    }

    #[test]
    fn test_remote_record_preferred() {
        let mut catalog = Catalog::new(Vec::new(), vec![remote("X", "2.0.0", &[])]);
        let mut queue = PatchQueue::new();
        let stale = remote("X", "1.0.0", &[]);

        queue_install(&mut catalog, &mut queue, stale, &NullEmitter).unwrap();
        assert_eq!(catalog.find_local("X").unwrap().version.to_string(), "2.0.0");
    }

    #[test]
    fn test_local_only_and_unresolved_are_warnings() {
        let (tx, mut rx) = channel();
        let mut catalog = Catalog::new(Vec::new(), Vec::new());
        let mut queue = PatchQueue::new();
        let mut record = remote("Imported", "1.0.0", &["Missing"]);
        record.source = SourceUrl::Local;
        record.is_remote = false;

        let resolution = queue_install(&mut catalog, &mut queue, record, &tx).unwrap();

        assert_eq!(resolution.queued, ["Imported"]);
        assert_eq!(resolution.local_only, ["Imported"]);
        assert_eq!(
            resolution.unresolved,
            [("Imported".to_string(), "Missing".to_string())]
        );
        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            AppEvent::Resolver(ResolverEvent::UnresolvedDependency { .. })
        )));
    }

    #[test]
    fn test_cycle_terminates() {
        let mut catalog = Catalog::new(
            Vec::new(),
            vec![remote("A", "1.0", &["B"]), remote("B", "1.0", &["A"])],
        );
        let mut queue = PatchQueue::new();
        let request = catalog.find_remote("A").cloned().unwrap();

        let resolution = queue_install(&mut catalog, &mut queue, request, &NullEmitter).unwrap();
        assert_eq!(resolution.queued, ["A", "B"]);
    }

    #[test]
    fn test_readd_cancels_pending_removal() {
        let mut catalog = Catalog::new(
            vec![installed("X", "1.0.0", &[])],
            vec![remote("X", "1.0.0", &[])],
        );
        let mut queue = PatchQueue::new();

        queue_uninstall(&mut catalog, &mut queue, "X", false, &NullEmitter).unwrap();
        assert_eq!(queue.uninstall, ["X"]);

        let request = catalog.find_remote("X").cloned().unwrap();
        let resolution = queue_install(&mut catalog, &mut queue, request, &NullEmitter).unwrap();
        assert_eq!(resolution.uninstall_cancelled, ["X"]);
        assert!(queue.uninstall.is_empty());
        assert!(queue.install.is_empty());
        assert_eq!(catalog.find_local("X").unwrap().state, PackageState::Installed);
    }

    #[test]
    fn test_uninstall_dependency_conflict() {
        let mut catalog = Catalog::new(
            vec![
                installed("C", "1.0", &[]),
                installed("L", "1.0", &["C"]),
                installed("M", "1.0", &["C"]),
            ],
            Vec::new(),
        );
        let mut queue = PatchQueue::new();

        let err = queue_uninstall(&mut catalog, &mut queue, "C", false, &NullEmitter).unwrap_err();
        match err {
            Error::Install(InstallError::DependencyConflict { dependents, .. }) => {
                assert_eq!(dependents, ["L", "M"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(queue.uninstall.is_empty());

        let removal = queue_uninstall(&mut catalog, &mut queue, "C", true, &NullEmitter).unwrap();
        assert_eq!(removal, Removal::Queued);
        assert_eq!(
            catalog.find_local("C").unwrap().state,
            PackageState::QueuedUninstall
        );
    }

    #[test]
    fn test_dependents_queued_for_removal_do_not_block() {
        let mut catalog = Catalog::new(
            vec![installed("C", "1.0", &[]), installed("L", "1.0", &["C"])],
            Vec::new(),
        );
        let mut queue = PatchQueue::new();

        queue_uninstall(&mut catalog, &mut queue, "L", false, &NullEmitter).unwrap();
        queue_uninstall(&mut catalog, &mut queue, "C", false, &NullEmitter).unwrap();
        assert_eq!(queue.uninstall, ["L", "C"]);
    }

    #[test]
    fn test_uninstall_not_installed() {
        let mut catalog = Catalog::new(Vec::new(), vec![remote("X", "1.0", &[])]);
        let mut queue = PatchQueue::new();
        assert!(matches!(
            queue_uninstall(&mut catalog, &mut queue, "X", true, &NullEmitter),
            Err(Error::Install(InstallError::NotInstalled { .. }))
        ));
    }

    #[test]
    fn test_uninstall_withdraws_queued_install() {
        let mut catalog = Catalog::new(Vec::new(), vec![remote("X", "1.0", &[])]);
        let mut queue = PatchQueue::new();
        let request = catalog.find_remote("X").cloned().unwrap();
        queue_install(&mut catalog, &mut queue, request, &NullEmitter).unwrap();

        let removal = queue_uninstall(&mut catalog, &mut queue, "X", false, &NullEmitter).unwrap();
        assert_eq!(removal, Removal::InstallCancelled);
        assert!(queue.is_empty());
        assert!(catalog.find_local("X").is_none());
    }

    #[test]
    fn test_uninstall_drops_pending_update() {
        let mut catalog = Catalog::new(
            vec![installed("X", "1.0.0", &[])],
            vec![remote("X", "1.1.0", &[])],
        );
        let mut queue = PatchQueue::new();
        check_updates(&mut catalog, &mut queue, true, &NullEmitter).unwrap();
        assert_eq!(queue.update, ["X"]);

        queue_uninstall(&mut catalog, &mut queue, "X", false, &NullEmitter).unwrap();
        assert!(queue.update.is_empty());
        assert_eq!(queue.uninstall, ["X"]);
    }

    #[test]
    fn test_check_updates() {
        let mut catalog = Catalog::new(
            vec![
                installed("Newer", "1.0.0", &[]),
                installed("Same", "1.2", &[]),
                installed("LocalOnly", "1.0", &[]),
            ],
            vec![
                remote("Newer", "1.1.0", &[]),
                remote("Same", "1.2.0", &[]),
                remote("NotInstalled", "3.0", &[]),
            ],
        );
        let mut queue = PatchQueue::new();

        let flagged = check_updates(&mut catalog, &mut queue, true, &NullEmitter).unwrap();

        assert_eq!(flagged, ["Newer"]);
        assert_eq!(queue.update, ["Newer"]);
        assert_eq!(
            catalog.find_local("Newer").unwrap().state,
            PackageState::QueuedUpdate
        );
        assert_eq!(
            catalog.find_remote("Same").unwrap().state,
            PackageState::Installed
        );
        assert_eq!(
            catalog.find_remote("NotInstalled").unwrap().state,
            PackageState::Untracked
        );
    }

    #[test]
    fn test_check_without_flagging_only_marks() {
        let mut catalog = Catalog::new(
            vec![installed("X", "1.0.0", &[])],
            vec![remote("X", "1.1.0", &[])],
        );
        let mut queue = PatchQueue::new();
        let flagged = check_updates(&mut catalog, &mut queue, false, &NullEmitter).unwrap();
        assert!(flagged.is_empty());
        assert!(queue.update.is_empty());
        assert_eq!(catalog.find_remote("X").unwrap().status_label(), "installed");
    }

    proptest! {
        // arbitrary graphs over a small name space, cycles included
        #[test]
        fn prop_closure_queues_each_name_once(
            edges in proptest::collection::vec((0usize..6, 0usize..6), 0..20),
            root in 0usize..6,
        ) {
            let names = ["A", "B", "C", "D", "E", "F"];
            let records: Vec<PackageRecord> = names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let deps: Vec<&str> = edges
                        .iter()
                        .filter(|(from, _)| *from == i)
                        .map(|(_, to)| names[*to])
                        .collect();
                    remote(name, "1.0", &deps)
                })
                .collect();
            let mut catalog = Catalog::new(Vec::new(), records);
            let mut queue = PatchQueue::new();
            let request = catalog.find_remote(names[root]).cloned().unwrap();

            let resolution = queue_install(&mut catalog, &mut queue, request, &NullEmitter).unwrap();

            let mut seen = std::collections::HashSet::new();
            for name in &queue.install {
                prop_assert!(seen.insert(name.clone()));
            }
            prop_assert_eq!(resolution.queued.len(), queue.install.len());
            prop_assert_eq!(queue.install[0].as_str(), names[root]);
        }
    }
}
