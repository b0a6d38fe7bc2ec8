//! Migration-compatibility adapters.
//!
//! Each adapter keeps one external contract for its domain and picks, at
//! construction, between the state-machine implementation and the legacy
//! per-domain logic. Call sites see the same status shapes either way, so the
//! legacy branch can be deleted once the machine is validated everywhere.
//!
//! 迁移兼容适配器：对外契约不变，内部按特性开关选择实现。

mod email_onboarding;
mod navigation;
mod phone_type;
mod secure_storage;

use std::sync::Arc;

use ds_core::{
    state::AppState,
    user::{UserData, UserId},
};

use crate::feature_flag::FeatureFlagGate;
use crate::usecases::{LoadingOrchestrator, LoadingPorts, OrchestratorError};

pub use email_onboarding::{EmailOnboardingAdapter, EmailOnboardingStatus};
pub use navigation::NavigationAdapter;
pub use phone_type::{PhoneTypeAdapter, PhoneTypeStatus};
pub use secure_storage::{SecureStorageAdapter, SecureStorageStatus};

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
    #[error("no signed-in user")]
    NotSignedIn,
    #[error("{operation} failed: {source}")]
    Repository {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl AdapterError {
    fn repository(operation: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| AdapterError::Repository { operation, source }
    }
}

/// Handle on the state machine, present only when the machine is enabled.
#[derive(Clone)]
pub struct MachineAccess {
    orchestrator: Arc<LoadingOrchestrator>,
}

impl MachineAccess {
    pub fn new(orchestrator: Arc<LoadingOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// `None` when the gate disables the machine, so legacy call sites keep
    /// their own logic.
    pub fn optional(
        gate: &FeatureFlagGate,
        orchestrator: &Arc<LoadingOrchestrator>,
    ) -> Option<Self> {
        gate.use_state_machine()
            .then(|| Self::new(Arc::clone(orchestrator)))
    }

    pub fn state(&self) -> Arc<AppState> {
        self.orchestrator.state()
    }

    pub fn orchestrator(&self) -> &Arc<LoadingOrchestrator> {
        &self.orchestrator
    }
}

/// Signed-in user's profile as the legacy code paths read it: straight from
/// the repositories, without going through the machine.
#[derive(Clone)]
pub(crate) struct LegacyProfile {
    ports: LoadingPorts,
}

impl LegacyProfile {
    pub(crate) fn new(ports: LoadingPorts) -> Self {
        Self { ports }
    }

    pub(crate) fn ports(&self) -> &LoadingPorts {
        &self.ports
    }

    pub(crate) async fn current_user(&self) -> Result<Option<UserId>, AdapterError> {
        let session = self
            .ports
            .auth
            .load_session()
            .await
            .map_err(AdapterError::repository("load session"))?;
        Ok(session.map(|session| session.user.id))
    }

    pub(crate) async fn load(&self) -> Result<Option<(UserId, UserData)>, AdapterError> {
        let Some(user) = self.current_user().await? else {
            return Ok(None);
        };
        let data = self
            .ports
            .user_data
            .load(&user)
            .await
            .map_err(AdapterError::repository("load user data"))?;
        Ok(Some((user, data)))
    }

    /// Load, apply `change`, save. Fails with `NotSignedIn` without a session.
    pub(crate) async fn update(
        &self,
        change: impl FnOnce(&mut UserData),
    ) -> Result<UserData, AdapterError> {
        let (user, mut data) = self.load().await?.ok_or(AdapterError::NotSignedIn)?;
        change(&mut data);
        self.ports
            .user_data
            .save(&user, &data)
            .await
            .map_err(AdapterError::repository("save user data"))?;
        Ok(data)
    }
}

/// All four adapters, built from one flag decision.
pub struct MigrationAdapters {
    pub secure_storage: SecureStorageAdapter,
    pub phone_type: PhoneTypeAdapter,
    pub email_onboarding: EmailOnboardingAdapter,
    pub navigation: NavigationAdapter,
}

impl MigrationAdapters {
    pub fn build(
        gate: &FeatureFlagGate,
        orchestrator: &Arc<LoadingOrchestrator>,
        ports: LoadingPorts,
    ) -> Self {
        let machine = MachineAccess::optional(gate, orchestrator);
        let network_timeout = orchestrator.network_timeout();
        Self {
            secure_storage: SecureStorageAdapter::new(machine.clone(), ports.clone()),
            phone_type: PhoneTypeAdapter::new(machine.clone(), ports.clone()),
            email_onboarding: EmailOnboardingAdapter::new(machine.clone(), ports.clone()),
            navigation: NavigationAdapter::new(machine, ports, network_timeout),
        }
    }

    pub fn uses_state_machine(&self) -> bool {
        self.navigation.machine_state().is_some()
    }
}
