//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use modman_ops::{PackageInfo, PatchReport, ReinstallReport};

/// Result of a command, rendered once the command finishes
pub enum OperationResult {
    PackageList(Vec<PackageInfo>),
    SearchResults(Vec<PackageInfo>),
    PatchReport(PatchReport),
    ReinstallReport(ReinstallReport),
    Success(String),
}

/// Output renderer for CLI results
#[derive(Clone, Copy, Default)]
pub struct OutputRenderer;

impl OutputRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render_result(&self, result: &OperationResult) {
        match result {
            OperationResult::PackageList(packages) => {
                if packages.is_empty() {
                    println!("No packages installed.");
                } else {
                    self.render_packages(packages);
                }
            }
            OperationResult::SearchResults(packages) => {
                if packages.is_empty() {
                    println!("No packages found.");
                } else {
                    self.render_packages(packages);
                }
            }
            OperationResult::PatchReport(report) => self.render_patch_report(report),
            OperationResult::ReinstallReport(report) => {
                println!("Reinstalling {} packages", report.packages.len());
                self.render_patch_report(&report.removal);
                self.render_patch_report(&report.install);
            }
            OperationResult::Success(message) => println!("{message}"),
        }
    }

    fn render_packages(&self, packages: &[PackageInfo]) {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Package").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Dependencies").add_attribute(Attribute::Bold),
        ]);

        for package in packages {
            let version = match &package.installed_version {
                Some(installed) if *installed != package.version => {
                    format!("{installed} -> {}", package.version)
                }
                _ => package.version.to_string(),
            };
            table.add_row(vec![
                Cell::new(&package.name),
                Cell::new(version),
                Cell::new(package.category.to_string()),
                self.status_cell(package.status),
                Cell::new(package.dependencies.join(", ")),
            ]);
        }

        println!("{table}");
    }

    fn status_cell(&self, status: &str) -> Cell {
        let color = match status {
            "installed" => Color::Green,
            "install" | "update pending" => Color::Cyan,
            "uninstall" => Color::Yellow,
            "ignored" => Color::DarkGrey,
            _ => Color::Reset,
        };
        Cell::new(if status.is_empty() { "-" } else { status }).fg(color)
    }

    fn render_patch_report(&self, report: &PatchReport) {
        if report.removed.is_empty() && report.installed.is_empty() && report.is_success() {
            println!("Nothing to do.");
            return;
        }
        if !report.removed.is_empty() {
            println!("Removed: {}", report.removed.join(", "));
        }
        if !report.installed.is_empty() {
            println!("Installed: {}", report.installed.join(", "));
        }
        for name in &report.dropped_updates {
            println!("Update dropped: {name} is no longer in the remote catalog");
        }
        for failure in &report.failures {
            println!(
                "Failed: {} during {}: {}",
                failure.package, failure.phase, failure.error
            );
        }
    }
}
