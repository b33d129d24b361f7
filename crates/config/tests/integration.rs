//! Integration tests for config

#[cfg(test)]
mod tests {
    use modman_config::*;
    use modman_types::AppType;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        std::env::remove_var(constants::ENV_INSTALL_ROOT);
        std::env::remove_var(constants::ENV_APP_TYPE);
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
app_type = "oculus"
parallel_downloads = 8

[paths]
install_root = "/games/app"

[network]
api_url = "http://localhost:9000/api/v1/"
retries = 5
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.app_type, AppType::Oculus);
        assert_eq!(config.general.parallel_downloads, 8);
        assert_eq!(config.paths.install_root, Some(PathBuf::from("/games/app")));
        assert_eq!(config.network.api_url, "http://localhost:9000/api/v1/");
        assert_eq!(config.network.retries, 5);
        // untouched sections keep defaults
        assert_eq!(config.network.download_base_url, "https://beatmods.com");
        assert_eq!(config.catalog.status_filter, "approved");
        assert_eq!(config.catalog.sort_field, "name_lower");
    }

    #[tokio::test]
    async fn test_invalid_toml_is_a_parse_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[general\napp_type = ").unwrap();
        assert!(Config::load_from_file(temp_file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.paths.install_root = Some(PathBuf::from("/games/app"));
        config.general.parallel_downloads = 2;
        config.save_to(&path).await.unwrap();

        let loaded = Config::load_or_default(Some(&path)).await.unwrap();
        assert_eq!(loaded.paths.install_root, config.paths.install_root);
        assert_eq!(loaded.general.parallel_downloads, 2);
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var(constants::ENV_INSTALL_ROOT, "/tmp/app");
        std::env::set_var(constants::ENV_APP_TYPE, "Oculus");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.paths.install_root, Some(PathBuf::from("/tmp/app")));
        assert_eq!(config.general.app_type, AppType::Oculus);

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var(constants::ENV_APP_TYPE, "invalid");

        let mut config = Config::default();
        assert!(config.merge_env().is_err());

        clear_env();
    }

    #[test]
    fn test_install_paths_requires_root() {
        let config = Config::default();
        assert!(config.install_paths().is_err());

        let mut config = Config::default();
        config.paths.install_root = Some(PathBuf::from("/games/app"));
        let paths = config.install_paths().unwrap();
        assert_eq!(paths.meta_dir, PathBuf::from("/games/app/.modman/meta"));
    }
}
