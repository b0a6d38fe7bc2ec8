//! # Configuration Loader / 配置加载器
//!
//! Reads a TOML file into the [`AppConfig`] DTO. Anything present in the file
//! is accepted as-is; filling in defaults happens in [`super::wiring`].
//!
//! > **Pure data loading only. Accept whatever is in the file.**

use anyhow::Context;
use ds_core::config::AppConfig;
use std::path::PathBuf;

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read or is not valid TOML.
pub fn load_config(config_path: PathBuf) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_reads_valid_toml() {
        let toml_content = r#"
            [storage]
            database_path = "/path/to/deskstate.db"
            session_path = "/path/to/session.json"

            [network]
            timeout_secs = 30

            [features]
            use_state_machine = false
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(temp_file.path().to_path_buf()).unwrap();

        assert_eq!(config.database_path, PathBuf::from("/path/to/deskstate.db"));
        assert_eq!(config.session_path, PathBuf::from("/path/to/session.json"));
        assert_eq!(config.network_timeout_secs, 30);
        assert_eq!(config.use_state_machine, Some(false));
    }

    #[test]
    fn test_load_config_returns_empty_values_when_missing() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[storage]\n").unwrap();

        let config = load_config(temp_file.path().to_path_buf()).unwrap();

        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn test_load_config_rejects_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[storage\ndatabase_path = ").unwrap();

        let result = load_config(temp_file.path().to_path_buf());

        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_reports_missing_file() {
        let result = load_config(PathBuf::from("/nonexistent/deskstate/config.toml"));

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Failed to read config file"));
    }
}
