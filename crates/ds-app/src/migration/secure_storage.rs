use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, warn};

use ds_core::{
    onboarding::OnboardingStep,
    selectors::{
        select_has_completed_secure_storage, select_has_key_store,
        select_is_checking_secure_storage, select_is_database_initialized,
    },
    state::AppState,
};

use super::{AdapterError, LegacyProfile, MachineAccess};
use crate::usecases::LoadingPorts;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecureStorageStatus {
    pub is_checking: bool,
    pub has_key_store: Option<bool>,
    pub is_database_initialized: bool,
    pub has_completed_setup: bool,
}

impl SecureStorageStatus {
    fn from_state(state: &AppState) -> Self {
        Self {
            is_checking: select_is_checking_secure_storage(state),
            has_key_store: select_has_key_store(state),
            is_database_initialized: select_is_database_initialized(state),
            has_completed_setup: select_has_completed_secure_storage(state),
        }
    }
}

/// Key-store and database readiness for the secure-storage screen.
pub enum SecureStorageAdapter {
    Machine(MachineAccess),
    Legacy(LegacySecureStorage),
}

impl SecureStorageAdapter {
    pub fn new(machine: Option<MachineAccess>, ports: LoadingPorts) -> Self {
        match machine {
            Some(machine) => SecureStorageAdapter::Machine(machine),
            None => SecureStorageAdapter::Legacy(LegacySecureStorage::new(ports)),
        }
    }

    pub fn machine_state(&self) -> Option<Arc<AppState>> {
        match self {
            SecureStorageAdapter::Machine(machine) => Some(machine.state()),
            SecureStorageAdapter::Legacy(_) => None,
        }
    }

    pub fn status(&self) -> SecureStorageStatus {
        match self {
            SecureStorageAdapter::Machine(machine) => {
                SecureStorageStatus::from_state(&machine.state())
            }
            SecureStorageAdapter::Legacy(legacy) => legacy.snapshot(),
        }
    }

    pub async fn refresh(&self) -> Result<SecureStorageStatus, AdapterError> {
        match self {
            SecureStorageAdapter::Machine(machine) => {
                let state = machine.orchestrator().drive().await;
                Ok(SecureStorageStatus::from_state(&state))
            }
            SecureStorageAdapter::Legacy(legacy) => legacy.refresh().await,
        }
    }

    /// Dismiss the secure-storage setup screen.
    pub async fn complete_setup(&self) -> Result<SecureStorageStatus, AdapterError> {
        match self {
            SecureStorageAdapter::Machine(machine) => {
                let outcome = machine
                    .orchestrator()
                    .complete_onboarding_step(OnboardingStep::SecureStorage, None)
                    .await?;
                Ok(SecureStorageStatus::from_state(outcome.state()))
            }
            SecureStorageAdapter::Legacy(legacy) => legacy.complete_setup().await,
        }
    }
}

pub struct LegacySecureStorage {
    profile: LegacyProfile,
    status: Mutex<SecureStorageStatus>,
}

impl LegacySecureStorage {
    fn new(ports: LoadingPorts) -> Self {
        Self {
            profile: LegacyProfile::new(ports),
            status: Mutex::new(SecureStorageStatus::default()),
        }
    }

    fn snapshot(&self) -> SecureStorageStatus {
        match self.status.lock() {
            Ok(status) => status.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update(&self, change: impl FnOnce(&mut SecureStorageStatus)) -> SecureStorageStatus {
        let mut status = match self.status.lock() {
            Ok(status) => status,
            Err(poisoned) => poisoned.into_inner(),
        };
        change(&mut status);
        status.clone()
    }

    async fn refresh(&self) -> Result<SecureStorageStatus, AdapterError> {
        self.update(|status| status.is_checking = true);
        let ports = self.profile.ports();

        let has_key_store = match ports.storage.has_key_store().await {
            Ok(found) => found,
            Err(err) => {
                warn!(error = %err, "legacy key-store check failed");
                self.update(|status| status.is_checking = false);
                return Err(AdapterError::Repository {
                    operation: "check key store",
                    source: err,
                });
            }
        };
        let database_ready = match ports.database.initialize().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "legacy database initialization failed");
                false
            }
        };
        let dismissed = match self.profile.load().await? {
            Some((_, data)) => data.storage_setup_dismissed,
            None => false,
        };
        let needs_setup = ports.platform.detect().is_macos();

        let status = self.update(|status| {
            status.is_checking = false;
            status.has_key_store = Some(has_key_store);
            status.is_database_initialized = database_ready;
            status.has_completed_setup = !needs_setup || dismissed;
        });
        debug!(?status, "legacy secure storage refreshed");
        Ok(status)
    }

    async fn complete_setup(&self) -> Result<SecureStorageStatus, AdapterError> {
        self.profile
            .update(|data| data.storage_setup_dismissed = true)
            .await?;
        Ok(self.update(|status| status.has_completed_setup = true))
    }
}
