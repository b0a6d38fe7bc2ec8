use serde::Serialize;
use tracing::info_span;
use tracing::Instrument;

use ds_core::derive::{derive_remaining_steps, NavigationTarget};
use ds_core::ports::AppDirsPort;
use ds_core::{AppState, OnboardingStep};
use ds_platform::DirsAppDirsAdapter;

use super::wiring::{build_runtime, AppRuntime};
use crate::cli::{Cli, Command};

#[derive(Debug, Serialize)]
struct StatusReport {
    use_state_machine: bool,
    target: NavigationTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<AppState>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    remaining_steps: Vec<OnboardingStep>,
}

#[derive(Debug, Serialize)]
struct FlagReport {
    use_state_machine: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    persisted: Option<bool>,
}

/// Entry point used by `main`: resolve config, wire, run one command.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let app_dirs = DirsAppDirsAdapter::new().get_app_dirs()?;
    let runtime = build_runtime(cli.config.clone(), &app_dirs, cli.state_machine)?;
    execute(&runtime, &cli.command).await
}

/// Run `command` against an already wired runtime and render its output.
pub async fn execute(runtime: &AppRuntime, command: &Command) -> anyhow::Result<String> {
    match command {
        Command::Status => {
            let span = info_span!("command.status");
            async {
                let use_state_machine = runtime.adapters.uses_state_machine();
                if use_state_machine {
                    runtime.orchestrator.boot().await;
                }
                let target = runtime.adapters.navigation.refresh().await;
                let state = runtime
                    .adapters
                    .navigation
                    .machine_state()
                    .map(|state| state.as_ref().clone());
                let remaining_steps = state
                    .as_ref()
                    .map(derive_remaining_steps)
                    .unwrap_or_default();

                let report = StatusReport {
                    use_state_machine,
                    target,
                    state,
                    remaining_steps,
                };
                Ok::<_, anyhow::Error>(serde_json::to_string_pretty(&report)?)
            }
            .instrument(span)
            .await
        }
        Command::Logout => {
            runtime.orchestrator.logout().await?;
            Ok("signed out".to_string())
        }
        Command::Flag { set } => {
            if let Some(value) = set {
                runtime.gate.persist(*value)?;
            }
            let report = FlagReport {
                use_state_machine: runtime.gate.use_state_machine(),
                persisted: *set,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}
