//! # Dependency Injection / 依赖注入模块
//!
//! The only place that depends on ds-infra, ds-platform and ds-app at once.
//! It assembles; it does not decide. Policy such as "what happens when the
//! database fails" lives in the orchestrator.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use ds_app::feature_flag::{init_process_flag, read_env_override};
use ds_app::migration::MigrationAdapters;
use ds_app::{FeatureFlagGate, LoadingOrchestrator, LoadingPorts, StateStore};
use ds_core::app_dirs::AppDirs;
use ds_core::config::AppConfig;
use ds_infra::{
    DieselDatabaseService, FileAuthSessionRepository, FileFeatureFlagRepository,
    FileKeyStoreProbe, FileUserDataRepository,
};
use ds_platform::SystemPlatformProbe;

use super::config::load_config;

/// Everything a command needs, built once per process.
pub struct AppRuntime {
    pub config: AppConfig,
    pub orchestrator: Arc<LoadingOrchestrator>,
    pub gate: FeatureFlagGate,
    pub adapters: MigrationAdapters,
    pub ports: LoadingPorts,
}

/// Load the config file and fill empty fields from the data directory.
///
/// An explicit path must exist. The default `config.toml` is optional.
pub fn resolve_config(explicit: Option<PathBuf>, app_dirs: &AppDirs) -> anyhow::Result<AppConfig> {
    let loaded = match explicit {
        Some(path) => load_config(path)?,
        None => {
            let default_path = app_dirs.config_path();
            if default_path.exists() {
                load_config(default_path)?
            } else {
                AppConfig::empty()
            }
        }
    };

    Ok(loaded.or_defaults(AppConfig::with_system_defaults(
        app_dirs.app_data_root.clone(),
    )))
}

fn create_ports(config: &AppConfig) -> LoadingPorts {
    LoadingPorts {
        storage: Arc::new(FileKeyStoreProbe::new(config.key_store_path.clone())),
        database: Arc::new(DieselDatabaseService::new(config.database_path.clone())),
        auth: Arc::new(FileAuthSessionRepository::new(config.session_path.clone())),
        user_data: Arc::new(FileUserDataRepository::new(config.user_data_path.clone())),
        platform: Arc::new(SystemPlatformProbe::new()),
    }
}

/// Build the runtime from a resolved config.
///
/// Flag precedence: `cli_override`, then `DS_STATE_MACHINE`, then
/// `[features] use_state_machine`, then the persisted flag store.
pub fn wire_dependencies(config: AppConfig, cli_override: Option<bool>) -> AppRuntime {
    let ports = create_ports(&config);
    let orchestrator = Arc::new(LoadingOrchestrator::new(
        StateStore::default().arc(),
        ports.clone(),
        Duration::from_secs(config.network_timeout_secs),
    ));

    let runtime_override = cli_override
        .or_else(read_env_override)
        .or(config.use_state_machine);
    let gate = FeatureFlagGate::new(Arc::new(FileFeatureFlagRepository::new(
        config.feature_flags_path.clone(),
    )))
    .with_override(runtime_override);
    let enabled = init_process_flag(&gate);
    info!(use_state_machine = enabled, "runtime wired");

    let adapters = MigrationAdapters::build(&gate, &orchestrator, ports.clone());

    AppRuntime {
        config,
        orchestrator,
        gate,
        adapters,
        ports,
    }
}

/// Resolve config under `app_dirs` and wire the runtime in one go.
pub fn build_runtime(
    config_path: Option<PathBuf>,
    app_dirs: &AppDirs,
    cli_override: Option<bool>,
) -> anyhow::Result<AppRuntime> {
    let config = resolve_config(config_path, app_dirs).context("resolve configuration")?;
    Ok(wire_dependencies(config, cli_override))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn dirs_under(root: &std::path::Path) -> AppDirs {
        AppDirs {
            app_data_root: root.to_path_buf(),
        }
    }

    #[test]
    fn resolve_config_without_file_uses_data_dir_defaults() {
        let dir = tempdir().unwrap();
        let app_dirs = dirs_under(dir.path());

        let config = resolve_config(None, &app_dirs).unwrap();

        assert_eq!(
            config,
            AppConfig::with_system_defaults(dir.path().to_path_buf())
        );
    }

    #[test]
    fn resolve_config_keeps_explicit_values() {
        let dir = tempdir().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[network]\ntimeout_secs = 5\n[features]\nuse_state_machine = false\n")
            .unwrap();

        let config =
            resolve_config(Some(file.path().to_path_buf()), &dirs_under(dir.path())).unwrap();

        assert_eq!(config.network_timeout_secs, 5);
        assert_eq!(config.use_state_machine, Some(false));
        assert_eq!(config.database_path, dir.path().join("deskstate.db"));
    }

    #[test]
    fn resolve_config_requires_explicit_file_to_exist() {
        let dir = tempdir().unwrap();

        let result = resolve_config(
            Some(dir.path().join("missing.toml")),
            &dirs_under(dir.path()),
        );

        assert!(result.is_err());
    }

    #[test]
    fn cli_override_beats_config_switch() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::with_system_defaults(dir.path().to_path_buf());
        config.use_state_machine = Some(false);

        let runtime = wire_dependencies(config, Some(true));

        assert!(runtime.gate.use_state_machine());
        assert!(runtime.adapters.uses_state_machine());
    }

    #[test]
    fn config_timeout_reaches_orchestrator() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::with_system_defaults(dir.path().to_path_buf());
        config.network_timeout_secs = 7;

        let runtime = wire_dependencies(config, Some(false));

        assert_eq!(
            runtime.orchestrator.network_timeout(),
            Duration::from_secs(7)
        );
        assert!(!runtime.adapters.uses_state_machine());
    }
}
