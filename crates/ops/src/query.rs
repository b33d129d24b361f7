//! Search and listing

use crate::{load_remote, OpsCtx, PackageInfo, Session};
use modman_errors::Error;

/// Search the remote catalog, annotated with local install state
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub async fn search(ctx: &OpsCtx, session: &Session, query: &str) -> Result<Vec<PackageInfo>, Error> {
    let records = load_remote(ctx, query).await?;

    Ok(records
        .iter()
        .map(|remote| {
            let mut info = PackageInfo::from_record(remote);
            if let Some(local) = session.catalog.find_local(&remote.name) {
                info.installed_version = Some(local.version.clone());
                info.status = local.status_label();
            }
            info
        })
        .collect())
}

/// Installed and queued packages, sorted by name
#[must_use]
pub fn list(session: &Session) -> Vec<PackageInfo> {
    session
        .catalog
        .local()
        .iter()
        .map(|local| {
            let mut info = PackageInfo::from_record(local);
            if let Some(remote) = session.catalog.find_remote(&local.name) {
                if remote.version != local.version {
                    info.installed_version = Some(local.version.clone());
                    info.version = remote.version.clone();
                }
            }
            info
        })
        .collect()
}
