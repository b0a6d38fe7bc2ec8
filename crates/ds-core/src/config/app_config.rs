//! # Pure Data Module / 纯数据模块
//!
//! Configuration DTO mapped from TOML. No validation and no default value
//! calculation here: empty paths and a zero timeout are valid facts, the
//! bootstrap layer decides how to fill them in.
//!
//! > **This module contains data only, no policy, no validation.**

use std::path::PathBuf;

/// Network-bound probes (authorization, profile load) give up after this long.
pub const DEFAULT_NETWORK_TIMEOUT_SECS: u64 = 120;

/// Application configuration DTO (pure data, no logic)
/// 应用配置 DTO（纯数据，无逻辑）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Local secure key-store file whose presence the storage probe reports
    pub key_store_path: PathBuf,

    /// Persisted auth session
    pub session_path: PathBuf,

    /// Per-user onboarding flags
    pub user_data_path: PathBuf,

    /// Persisted feature flags (key → bool)
    pub feature_flags_path: PathBuf,

    /// Timeout for network-bound operations, in seconds (0 = not configured)
    pub network_timeout_secs: u64,

    /// `[features] use_state_machine`, when present
    pub use_state_machine: Option<bool>,
}

impl AppConfig {
    /// Create AppConfig from TOML value
    /// 从 TOML 值创建 AppConfig
    ///
    /// **Prohibited / 禁止**: no validation or default value logic.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let path = |section: &str, key: &str| {
            PathBuf::from(
                toml_value
                    .get(section)
                    .and_then(|s| s.get(key))
                    .and_then(|v| v.as_str())
                    .unwrap_or(""),
            )
        };

        Ok(Self {
            database_path: path("storage", "database_path"),
            key_store_path: path("storage", "key_store_path"),
            session_path: path("storage", "session_path"),
            user_data_path: path("storage", "user_data_path"),
            feature_flags_path: path("storage", "feature_flags_path"),
            network_timeout_secs: toml_value
                .get("network")
                .and_then(|n| n.get("timeout_secs"))
                .and_then(|v| v.as_integer())
                .unwrap_or(0)
                .max(0) as u64,
            use_state_machine: toml_value
                .get("features")
                .and_then(|f| f.get("use_state_machine"))
                .and_then(|v| v.as_bool()),
        })
    }

    /// Create empty AppConfig (all empty/default values)
    pub fn empty() -> Self {
        Self {
            database_path: PathBuf::new(),
            key_store_path: PathBuf::new(),
            session_path: PathBuf::new(),
            user_data_path: PathBuf::new(),
            feature_flags_path: PathBuf::new(),
            network_timeout_secs: 0,
            use_state_machine: None,
        }
    }

    /// Create AppConfig with system-default paths for production use
    /// 生产环境使用：创建具有系统默认路径的 AppConfig
    ///
    /// `data_dir` is computed by the caller (platform layer).
    pub fn with_system_defaults(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("deskstate.db"),
            key_store_path: data_dir.join("keystore/master.key"),
            session_path: data_dir.join("session.json"),
            user_data_path: data_dir.join("user_data.json"),
            feature_flags_path: data_dir.join("feature_flags.json"),
            network_timeout_secs: DEFAULT_NETWORK_TIMEOUT_SECS,
            use_state_machine: None,
        }
    }

    /// Fill every empty field from `defaults`.
    pub fn or_defaults(self, defaults: AppConfig) -> Self {
        let pick = |value: PathBuf, fallback: PathBuf| {
            if value.as_os_str().is_empty() {
                fallback
            } else {
                value
            }
        };

        Self {
            database_path: pick(self.database_path, defaults.database_path),
            key_store_path: pick(self.key_store_path, defaults.key_store_path),
            session_path: pick(self.session_path, defaults.session_path),
            user_data_path: pick(self.user_data_path, defaults.user_data_path),
            feature_flags_path: pick(self.feature_flags_path, defaults.feature_flags_path),
            network_timeout_secs: if self.network_timeout_secs == 0 {
                defaults.network_timeout_secs
            } else {
                self.network_timeout_secs
            },
            use_state_machine: self.use_state_machine.or(defaults.use_state_machine),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toml::Value;

    #[test]
    fn test_from_toml_returns_empty_paths_when_missing() {
        let toml_value: Value = toml::from_str("[storage]\n").unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn test_from_toml_parses_values_when_present() {
        let toml_str = r#"
            [storage]
            database_path = "/data/app.db"
            session_path = "/data/session.json"

            [network]
            timeout_secs = 30
        "#;
        let toml_value: Value = toml::from_str(toml_str).unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        assert_eq!(config.database_path, PathBuf::from("/data/app.db"));
        assert_eq!(config.session_path, PathBuf::from("/data/session.json"));
        assert_eq!(config.key_store_path, PathBuf::new());
        assert_eq!(config.network_timeout_secs, 30);
        assert_eq!(config.use_state_machine, None);
    }

    #[test]
    fn test_from_toml_reads_feature_switch() {
        let toml_value: Value =
            toml::from_str("[features]\nuse_state_machine = false\n").unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        assert_eq!(config.use_state_machine, Some(false));
    }

    #[test]
    fn test_from_toml_clamps_negative_timeout_to_zero() {
        let toml_value: Value = toml::from_str("[network]\ntimeout_secs = -5\n").unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        assert_eq!(config.network_timeout_secs, 0);
    }

    #[test]
    fn test_with_system_defaults_creates_valid_paths() {
        let config = AppConfig::with_system_defaults(PathBuf::from("/tmp/test"));

        assert_eq!(config.database_path, PathBuf::from("/tmp/test/deskstate.db"));
        assert_eq!(
            config.key_store_path,
            PathBuf::from("/tmp/test/keystore/master.key")
        );
        assert_eq!(config.network_timeout_secs, DEFAULT_NETWORK_TIMEOUT_SECS);
    }

    #[test]
    fn test_or_defaults_keeps_explicit_values() {
        let mut config = AppConfig::empty();
        config.database_path = PathBuf::from("/custom.db");
        config.network_timeout_secs = 5;

        let merged = config.or_defaults(AppConfig::with_system_defaults(PathBuf::from("/d")));

        assert_eq!(merged.database_path, PathBuf::from("/custom.db"));
        assert_eq!(merged.session_path, PathBuf::from("/d/session.json"));
        assert_eq!(merged.network_timeout_secs, 5);
    }
}
