//! Patch execution and clean reinstall

use crate::{install, refresh, OpsCtx, ReinstallReport, Session};
use modman_errors::Error;
use modman_events::EventEmitter;
use modman_install::{PatchPlan, PatchReport, Patcher};
use modman_resolver::queue_uninstall;
use modman_types::PackageState;

/// Preview what [`patch`] would do with the current queues
#[must_use]
pub fn plan(session: &Session) -> PatchPlan {
    PatchPlan::from_queue(&session.catalog, &session.queue)
}

/// Apply every queued change to the installation root
///
/// Per-package failures are collected in the report. The in-memory catalog
/// reflects the run, but callers should [`refresh`] before queuing again.
///
/// # Errors
///
/// Returns an error only if the installation directories cannot be created.
pub async fn patch(ctx: &OpsCtx, session: &mut Session) -> Result<PatchReport, Error> {
    ctx.paths.ensure().await?;
    ctx.emit_operation_started("patch");

    let patcher = Patcher::new(ctx.store.clone(), ctx.paths.root(), ctx.archives.clone())
        .with_parallel_downloads(ctx.config.general.parallel_downloads);
    let report = patcher
        .patch(&mut session.catalog, &mut session.queue, ctx)
        .await;

    ctx.emit_operation_completed("patch", report.is_success());
    Ok(report)
}

/// Remove and reinstall every installed package that the remote catalog knows
///
/// Packages without a remote counterpart are left alone. There is no
/// rollback: a package whose reinstall fails stays uninstalled.
///
/// # Errors
///
/// Returns an error if a catalog refresh fails.
pub async fn clean_reinstall(ctx: &OpsCtx, session: &mut Session) -> Result<ReinstallReport, Error> {
    ctx.emit_operation_started("reinstall");
    refresh(ctx, session, false).await?;

    let packages: Vec<String> = session
        .catalog
        .local()
        .iter()
        .filter(|r| r.state == PackageState::Installed)
        .filter(|r| session.catalog.find_remote(&r.name).is_some())
        .map(|r| r.name.clone())
        .collect();

    for name in &packages {
        queue_uninstall(&mut session.catalog, &mut session.queue, name, true, ctx)?;
    }
    let removal = patch(ctx, session).await?;

    refresh(ctx, session, false).await?;
    for name in &packages {
        install(ctx, session, name)?;
    }
    let install = patch(ctx, session).await?;
    refresh(ctx, session, false).await?;

    let report = ReinstallReport {
        packages,
        removal,
        install,
    };
    ctx.emit_operation_completed("reinstall", report.is_success());
    Ok(report)
}
