//! Catalog loading and refresh

use crate::{OpsCtx, RefreshSummary, Session};
use modman_errors::Error;
use modman_events::{AppEvent, CatalogEvent, EventEmitter, FailureContext};
use modman_net::CatalogQuery;
use modman_types::{PackageRecord, PackageState};

/// Read installed packages from the manifest store
///
/// Ignored packages are left out. A manifest that cannot be read is
/// reported and skipped; the rest still load.
///
/// # Errors
///
/// Returns an error if the manifest directory itself cannot be listed.
pub async fn load_local(ctx: &OpsCtx) -> Result<Vec<PackageRecord>, Error> {
    let scan = ctx.store.manifests.scan().await?;

    for (path, error) in &scan.failures {
        ctx.emit(AppEvent::Catalog(CatalogEvent::ManifestSkipped {
            path: path.display().to_string(),
            failure: FailureContext::from_error(error),
        }));
    }

    let mut records = Vec::with_capacity(scan.manifests.len());
    let mut ignored = 0;
    for (_, manifest) in scan.manifests {
        let mut record = PackageRecord::from_manifest(manifest);
        if record.state == PackageState::Ignored {
            ignored += 1;
            continue;
        }
        // queues do not survive a refresh, so anything on disk is installed
        record.state = PackageState::Installed;
        record.is_remote = false;
        records.push(record);
    }

    if ignored > 0 {
        ctx.emit_debug(format!("{ignored} ignored packages left out of the local catalog"));
    }
    ctx.emit(AppEvent::Catalog(CatalogEvent::LocalLoaded {
        packages: records.len(),
        skipped: scan.failures.len(),
    }));
    Ok(records)
}

/// Search the remote catalog with the configured status and sort order
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub async fn load_remote(ctx: &OpsCtx, search: &str) -> Result<Vec<PackageRecord>, Error> {
    let query = CatalogQuery::all(&ctx.config.catalog).with_search(search);
    load_remote_query(ctx, &query).await
}

/// Query the remote catalog and convert entries for the configured platform
///
/// Entries without a usable download are reported and skipped.
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub async fn load_remote_query(
    ctx: &OpsCtx,
    query: &CatalogQuery,
) -> Result<Vec<PackageRecord>, Error> {
    let app_type = ctx.config.general.app_type;
    let entries = ctx.catalog_source.query(query).await?;

    let mut records = Vec::with_capacity(entries.len());
    for entry in &entries {
        match PackageRecord::from_listing(entry, app_type) {
            Ok(record) => records.push(record),
            Err(e) => ctx.emit(AppEvent::Catalog(CatalogEvent::RemoteEntrySkipped {
                name: entry.name.clone(),
                reason: e.to_string(),
            })),
        }
    }

    ctx.emit(AppEvent::Catalog(CatalogEvent::RemoteLoaded {
        packages: records.len(),
        app_type: app_type.to_string(),
    }));
    Ok(records)
}

/// Reload both catalogs and reconcile them
///
/// Clears every pending queue. Remote records with an installed local
/// counterpart are marked installed; with `check_updates`, installed
/// packages with a newer remote version are queued for update.
///
/// # Errors
///
/// Returns an error if either catalog cannot be loaded.
pub async fn refresh(
    ctx: &OpsCtx,
    session: &mut Session,
    check_updates: bool,
) -> Result<RefreshSummary, Error> {
    ctx.emit_operation_started("refresh");
    session.queue.clear();

    let local = load_local(ctx).await?;
    let remote = load_remote(ctx, "").await?;
    session.catalog.set_local(local);
    session.catalog.set_remote(remote);

    let updates = modman_resolver::check_updates(
        &mut session.catalog,
        &mut session.queue,
        check_updates,
        ctx,
    )?;

    ctx.emit_operation_completed("refresh", true);
    Ok(RefreshSummary {
        local: session.catalog.local().len(),
        remote: session.catalog.remote().len(),
        updates,
    })
}
