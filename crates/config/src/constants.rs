//! Fixed names inside an installation root
//!
//! These are not exposed via TOML configuration so that every front end
//! finds the same bookkeeping directory for a given target application.

/// Bookkeeping directory created under the installation root
pub const APP_DIR: &str = ".modman";

/// Downloaded archives, under [`APP_DIR`]
pub const CACHE_DIR: &str = "cache";

/// Installed-package manifests, under [`APP_DIR`]
pub const META_DIR: &str = "meta";

/// Optional self-description entry inside a package archive
pub const SELF_DESCRIPTION: &str = "spec.json";

/// Config file name under the user config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Environment override for `paths.install_root`
pub const ENV_INSTALL_ROOT: &str = "MODMAN_INSTALL_ROOT";

/// Environment override for `general.app_type`
pub const ENV_APP_TYPE: &str = "MODMAN_APP_TYPE";
