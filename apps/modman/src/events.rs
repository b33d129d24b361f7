//! Event handling and progress display

use crate::logging::log_event_with_tracing;
use console::{Style, Term};
use modman_events::{
    AppEvent, CatalogEvent, EventMessage, GeneralEvent, PatchEvent, ResolverEvent,
};

/// Event handler for user feedback
///
/// Every event is forwarded to tracing; the ones a user cares about are
/// also printed to stderr.
pub struct EventHandler {
    term: Term,
    status: Style,
    warning: Style,
    error: Style,
    debug_enabled: bool,
}

impl EventHandler {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            term: Term::stderr(),
            status: Style::new().cyan(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            debug_enabled,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        log_event_with_tracing(&message);
        let stamp = message.meta.timestamp;

        match message.event {
            AppEvent::General(GeneralEvent::Warning { message, context }) => match context {
                Some(context) => self.show_warning(&format!("{message} ({context})")),
                None => self.show_warning(&message),
            },
            AppEvent::General(GeneralEvent::Error { message, .. }) => self.show_error(&message),
            AppEvent::General(GeneralEvent::DebugLog { message, .. }) if self.debug_enabled => {
                self.show_status(&format!("[{}] {message}", stamp.format("%H:%M:%S%.3f")));
            }

            AppEvent::Catalog(CatalogEvent::ManifestSkipped { path, failure }) => {
                self.show_warning(&format!("skipped {path}: {}", failure.message));
            }
            AppEvent::Catalog(CatalogEvent::UpdateAvailable {
                package,
                installed,
                available,
            }) => {
                self.show_status(&format!("update available: {package} {installed} -> {available}"));
            }

            AppEvent::Resolver(ResolverEvent::Queued {
                package,
                version,
                pulled_in_by: Some(parent),
                ..
            }) => {
                self.show_status(&format!("{package} {version} required by {parent}"));
            }
            AppEvent::Resolver(ResolverEvent::LocalOnly { package }) => {
                self.show_warning(&format!("{package} is not in the remote catalog"));
            }
            AppEvent::Resolver(ResolverEvent::UnresolvedDependency {
                package,
                dependency,
            }) => {
                self.show_warning(&format!("{package} needs {dependency}, which was not found"));
            }

            AppEvent::Patch(PatchEvent::PackageRemoved {
                package, version, ..
            }) => self.show_status(&format!("removed {package} {version}")),
            AppEvent::Patch(PatchEvent::DownloadStarted { package, .. }) => {
                self.show_status(&format!("downloading {package}"));
            }
            AppEvent::Patch(PatchEvent::PackageInstalled {
                package, version, ..
            }) => self.show_status(&format!("installed {package} {version}")),
            AppEvent::Patch(PatchEvent::PackageFailed {
                package,
                phase,
                failure,
            }) => self.show_error(&format!("{package} failed during {phase}: {}", failure.message)),

            _ => {}
        }
    }

    fn show_status(&self, message: &str) {
        let _ = self.term.write_line(&self.status.apply_to(message).to_string());
    }

    fn show_warning(&self, message: &str) {
        let _ = self
            .term
            .write_line(&format!("{} {message}", self.warning.apply_to("warning:")));
    }

    fn show_error(&self, message: &str) {
        let _ = self
            .term
            .write_line(&format!("{} {message}", self.error.apply_to("error:")));
    }
}
