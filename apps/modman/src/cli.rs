//! Command line interface definition

use clap::{Parser, Subcommand};
use modman_types::AppType;
use std::path::PathBuf;

/// modman - dependency-aware mod manager
#[derive(Parser)]
#[command(name = "modman")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dependency-aware mod manager")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Application install root (overrides config and MODMAN_INSTALL_ROOT)
    #[arg(long, global = true, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Platform variant to download
    #[arg(long, global = true, value_enum)]
    pub app_type: Option<AppType>,

    /// Check for updates and apply them before running the command
    #[arg(long, short = 'u', global = true)]
    pub update: bool,

    /// Apply changes without asking for confirmation
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Search the remote catalog
    #[command(alias = "find")]
    Search {
        /// Search text; empty lists everything
        query: Option<String>,
    },

    /// List installed packages
    #[command(alias = "ls")]
    List,

    /// Install packages and their dependencies
    #[command(alias = "i")]
    Install {
        /// Package names
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Remove installed packages
    #[command(alias = "rm")]
    Remove {
        /// Package names
        #[arg(required = true)]
        packages: Vec<String>,

        /// Remove even if other installed packages depend on them
        #[arg(long)]
        force: bool,
    },

    /// Stop tracking an installed package, leaving its files in place
    Ignore {
        /// Package name
        package: String,
    },

    /// Install a package from a local archive
    Import {
        /// Path to the .zip archive
        archive: PathBuf,
    },

    /// Apply pending updates
    Patch,

    /// Remove and reinstall every installed package
    Reinstall,
}
