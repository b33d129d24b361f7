//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields.

use modman_events::{
    AppEvent, CatalogEvent, EventMessage, GeneralEvent, PatchEvent, ResolverEvent,
};
use tracing::{debug, error, info, warn};

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let source = meta.source.as_str();
    let event_id = meta.event_id;

    match &message.event {
        AppEvent::General(event) => match event {
            GeneralEvent::Warning { message, context } => {
                warn!(source, %event_id, context = ?context, "{message}");
            }
            GeneralEvent::Error { message, details } => {
                error!(source, %event_id, details = ?details, "{message}");
            }
            GeneralEvent::DebugLog { message, context } => {
                debug!(source, %event_id, context = ?context, "{message}");
            }
            GeneralEvent::OperationStarted { operation } => {
                info!(source, %event_id, operation = %operation, "Operation started");
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                info!(source, %event_id, operation = %operation, success, "Operation completed");
            }
            GeneralEvent::OperationFailed { operation, failure } => {
                error!(
                    source,
                    %event_id,
                    operation = %operation,
                    code = ?failure.code,
                    retryable = failure.retryable,
                    hint = ?failure.hint,
                    "{}",
                    failure.message
                );
            }
        },

        AppEvent::Catalog(event) => match event {
            CatalogEvent::LocalLoaded { packages, skipped } => {
                info!(source, %event_id, packages, skipped, "Local catalog loaded");
            }
            CatalogEvent::ManifestSkipped { path, failure } => {
                warn!(
                    source,
                    %event_id,
                    path = %path,
                    code = ?failure.code,
                    "Skipped unreadable manifest: {}",
                    failure.message
                );
            }
            CatalogEvent::RemoteLoaded { packages, app_type } => {
                info!(source, %event_id, packages, app_type = %app_type, "Remote catalog loaded");
            }
            CatalogEvent::RemoteEntrySkipped { name, reason } => {
                warn!(source, %event_id, package = %name, "Skipped remote entry: {reason}");
            }
            CatalogEvent::UpdateAvailable {
                package,
                installed,
                available,
            } => {
                info!(
                    source,
                    %event_id,
                    package = %package,
                    installed = %installed,
                    available = %available,
                    "Update available"
                );
            }
        },

        AppEvent::Resolver(event) => match event {
            ResolverEvent::Queued {
                package,
                version,
                queue,
                pulled_in_by,
            } => {
                info!(
                    source,
                    %event_id,
                    package = %package,
                    version = %version,
                    queue = ?queue,
                    pulled_in_by = ?pulled_in_by,
                    "Package queued"
                );
            }
            ResolverEvent::Dequeued { package, queue } => {
                debug!(source, %event_id, package = %package, queue = ?queue, "Package dequeued");
            }
            ResolverEvent::LocalOnly { package } => {
                warn!(source, %event_id, package = %package, "No remote record; installing from local archive");
            }
            ResolverEvent::UnresolvedDependency {
                package,
                dependency,
            } => {
                warn!(
                    source,
                    %event_id,
                    package = %package,
                    dependency = %dependency,
                    "Dependency not found"
                );
            }
            ResolverEvent::RemovalBlocked {
                package,
                dependents,
            } => {
                warn!(
                    source,
                    %event_id,
                    package = %package,
                    dependents = ?dependents,
                    "Removal blocked by dependents"
                );
            }
        },

        AppEvent::Patch(event) => match event {
            PatchEvent::PhaseStarted { phase, packages } => {
                info!(source, %event_id, phase = %phase, packages, "Patch phase started");
            }
            PatchEvent::PackageRemoved {
                package,
                version,
                files_removed,
                files_missing,
            } => {
                info!(
                    source,
                    %event_id,
                    package = %package,
                    version = %version,
                    files_removed,
                    files_missing,
                    "Package removed"
                );
            }
            PatchEvent::DownloadStarted { package, url } => {
                debug!(source, %event_id, package = %package, url = %url, "Download started");
            }
            PatchEvent::DownloadCompleted { package, bytes } => {
                debug!(source, %event_id, package = %package, bytes, "Download completed");
            }
            PatchEvent::PackageVerified {
                package,
                files,
                unlisted,
            } => {
                debug!(source, %event_id, package = %package, files, unlisted, "Archive verified");
            }
            PatchEvent::PackageInstalled {
                package,
                version,
                files,
            } => {
                info!(
                    source,
                    %event_id,
                    package = %package,
                    version = %version,
                    files,
                    "Package installed"
                );
            }
            PatchEvent::PackageFailed {
                package,
                phase,
                failure,
            } => {
                error!(
                    source,
                    %event_id,
                    package = %package,
                    phase = %phase,
                    code = ?failure.code,
                    retryable = failure.retryable,
                    "{}",
                    failure.message
                );
            }
            PatchEvent::CachePurged { archives } => {
                debug!(source, %event_id, archives, "Download cache purged");
            }
            PatchEvent::Completed {
                removed,
                installed,
                failed,
            } => {
                info!(source, %event_id, removed, installed, failed, "Patch completed");
            }
        },
    }
}

/// Initialize tracing
///
/// `RUST_LOG` takes precedence; `--debug` raises the default filter.
pub fn init_tracing(debug_enabled: bool) {
    let default_filter = if debug_enabled {
        "info,modman=debug,modman_ops=debug"
    } else {
        "warn,modman=warn"
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}
