use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use ds_core::{
    derive::{derive_navigation_target, NavigationParams, NavigationTarget, Screen},
    error::{AppError, ErrorCode},
    onboarding::first_incomplete_step,
    state::{AppState, LoadingPhase},
};

use super::MachineAccess;
use crate::usecases::{with_timeout, LoadingPorts};

/// Which top-level screen to show.
pub enum NavigationAdapter {
    Machine(MachineAccess),
    Legacy(LegacyNavigation),
}

impl NavigationAdapter {
    pub fn new(
        machine: Option<MachineAccess>,
        ports: LoadingPorts,
        network_timeout: Duration,
    ) -> Self {
        match machine {
            Some(machine) => NavigationAdapter::Machine(machine),
            None => NavigationAdapter::Legacy(LegacyNavigation {
                ports,
                network_timeout,
                target: Mutex::new(loading_target(LoadingPhase::CheckingStorage)),
            }),
        }
    }

    pub fn machine_state(&self) -> Option<Arc<AppState>> {
        match self {
            NavigationAdapter::Machine(machine) => Some(machine.state()),
            NavigationAdapter::Legacy(_) => None,
        }
    }

    pub fn target(&self) -> NavigationTarget {
        match self {
            NavigationAdapter::Machine(machine) => derive_navigation_target(&machine.state()),
            NavigationAdapter::Legacy(legacy) => legacy.snapshot(),
        }
    }

    /// Run pending startup work and return the screen to show.
    pub async fn refresh(&self) -> NavigationTarget {
        match self {
            NavigationAdapter::Machine(machine) => {
                let orchestrator = machine.orchestrator();
                orchestrator.drive().await;
                let state = orchestrator.settle_onboarding();
                derive_navigation_target(&state)
            }
            NavigationAdapter::Legacy(legacy) => legacy.refresh().await,
        }
    }
}

fn loading_target(phase: LoadingPhase) -> NavigationTarget {
    NavigationTarget {
        screen: Screen::Loading,
        params: NavigationParams {
            phase: Some(phase),
            ..NavigationParams::default()
        },
    }
}

fn error_target(error: AppError) -> NavigationTarget {
    NavigationTarget {
        screen: Screen::Error,
        params: NavigationParams {
            error: Some(error),
            ..NavigationParams::default()
        },
    }
}

pub struct LegacyNavigation {
    ports: LoadingPorts,
    network_timeout: Duration,
    target: Mutex<NavigationTarget>,
}

impl LegacyNavigation {
    fn snapshot(&self) -> NavigationTarget {
        match self.target.lock() {
            Ok(target) => target.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn publish(&self, next: NavigationTarget) -> NavigationTarget {
        let mut target = match self.target.lock() {
            Ok(target) => target,
            Err(poisoned) => poisoned.into_inner(),
        };
        *target = next.clone();
        next
    }

    async fn refresh(&self) -> NavigationTarget {
        let target = match self.resolve().await {
            Ok(target) => target,
            Err(error) => {
                warn!(code = %error.code, error = %error.message, "legacy navigation failed");
                error_target(error)
            }
        };
        debug!(screen = ?target.screen, step = ?target.params.step, "legacy navigation resolved");
        self.publish(target)
    }

    async fn resolve(&self) -> Result<NavigationTarget, AppError> {
        self.publish(loading_target(LoadingPhase::CheckingStorage));
        self.ports.storage.has_key_store().await.map_err(|err| {
            AppError::new(
                ErrorCode::StorageError,
                format!("key-store check failed: {err:#}"),
            )
        })?;

        self.publish(loading_target(LoadingPhase::InitializingDb));
        self.ports.database.initialize().await.map_err(|err| {
            AppError::new(
                ErrorCode::DatabaseInitError,
                format!("database initialization failed: {err:#}"),
            )
        })?;

        self.publish(loading_target(LoadingPhase::LoadingAuth));
        let session = with_timeout(
            "auth session load",
            self.network_timeout,
            ErrorCode::AuthLoadError,
            self.ports.auth.load_session(),
        )
        .await?;
        let Some(session) = session else {
            return Ok(NavigationTarget {
                screen: Screen::Login,
                params: NavigationParams::default(),
            });
        };

        self.publish(loading_target(LoadingPhase::LoadingUserData));
        let data = with_timeout(
            "user data load",
            self.network_timeout,
            ErrorCode::UserDataLoadError,
            self.ports.user_data.load(&session.user.id),
        )
        .await?;

        let platform = self.ports.platform.detect();
        let target = match first_incomplete_step(platform, &data) {
            Some(step) => NavigationTarget {
                screen: Screen::Onboarding,
                params: NavigationParams {
                    step: Some(step),
                    ..NavigationParams::default()
                },
            },
            None => NavigationTarget {
                screen: Screen::Dashboard,
                params: NavigationParams::default(),
            },
        };
        Ok(target)
    }
}
