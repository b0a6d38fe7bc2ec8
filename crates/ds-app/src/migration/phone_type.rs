use std::sync::{Arc, Mutex};

use serde::Serialize;

use ds_core::{
    onboarding::OnboardingStep,
    platform::PhoneType,
    selectors::{select_has_selected_phone_type, select_is_loading, select_phone_type},
    state::AppState,
};

use super::{AdapterError, LegacyProfile, MachineAccess};
use crate::usecases::LoadingPorts;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhoneTypeStatus {
    pub is_loading: bool,
    pub has_selected: bool,
    pub phone_type: Option<PhoneType>,
}

impl PhoneTypeStatus {
    fn from_state(state: &AppState) -> Self {
        Self {
            is_loading: select_is_loading(state),
            has_selected: select_has_selected_phone_type(state),
            phone_type: select_phone_type(state),
        }
    }
}

/// Phone-type selection.
pub enum PhoneTypeAdapter {
    Machine(MachineAccess),
    Legacy(LegacyPhoneType),
}

impl PhoneTypeAdapter {
    pub fn new(machine: Option<MachineAccess>, ports: LoadingPorts) -> Self {
        match machine {
            Some(machine) => PhoneTypeAdapter::Machine(machine),
            None => PhoneTypeAdapter::Legacy(LegacyPhoneType {
                profile: LegacyProfile::new(ports),
                status: Mutex::new(PhoneTypeStatus::default()),
            }),
        }
    }

    pub fn machine_state(&self) -> Option<Arc<AppState>> {
        match self {
            PhoneTypeAdapter::Machine(machine) => Some(machine.state()),
            PhoneTypeAdapter::Legacy(_) => None,
        }
    }

    pub fn status(&self) -> PhoneTypeStatus {
        match self {
            PhoneTypeAdapter::Machine(machine) => PhoneTypeStatus::from_state(&machine.state()),
            PhoneTypeAdapter::Legacy(legacy) => legacy.snapshot(),
        }
    }

    pub async fn refresh(&self) -> Result<PhoneTypeStatus, AdapterError> {
        match self {
            PhoneTypeAdapter::Machine(machine) => {
                let state = machine.orchestrator().drive().await;
                Ok(PhoneTypeStatus::from_state(&state))
            }
            PhoneTypeAdapter::Legacy(legacy) => legacy.refresh().await,
        }
    }

    pub async fn select(&self, phone_type: PhoneType) -> Result<PhoneTypeStatus, AdapterError> {
        match self {
            PhoneTypeAdapter::Machine(machine) => {
                let outcome = machine
                    .orchestrator()
                    .complete_onboarding_step(OnboardingStep::PhoneType, Some(phone_type))
                    .await?;
                Ok(PhoneTypeStatus::from_state(outcome.state()))
            }
            PhoneTypeAdapter::Legacy(legacy) => legacy.select(phone_type).await,
        }
    }
}

pub struct LegacyPhoneType {
    profile: LegacyProfile,
    status: Mutex<PhoneTypeStatus>,
}

impl LegacyPhoneType {
    fn snapshot(&self) -> PhoneTypeStatus {
        match self.status.lock() {
            Ok(status) => status.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, next: PhoneTypeStatus) -> PhoneTypeStatus {
        let mut status = match self.status.lock() {
            Ok(status) => status,
            Err(poisoned) => poisoned.into_inner(),
        };
        *status = next.clone();
        next
    }

    async fn refresh(&self) -> Result<PhoneTypeStatus, AdapterError> {
        self.replace(PhoneTypeStatus {
            is_loading: true,
            ..self.snapshot()
        });
        let phone_type = match self.profile.load().await {
            Ok(profile) => profile.and_then(|(_, data)| data.phone_type),
            Err(err) => {
                self.replace(PhoneTypeStatus {
                    is_loading: false,
                    ..self.snapshot()
                });
                return Err(err);
            }
        };
        Ok(self.replace(PhoneTypeStatus {
            is_loading: false,
            has_selected: phone_type.is_some(),
            phone_type,
        }))
    }

    async fn select(&self, phone_type: PhoneType) -> Result<PhoneTypeStatus, AdapterError> {
        let data = self
            .profile
            .update(|data| data.phone_type = Some(phone_type))
            .await?;
        Ok(self.replace(PhoneTypeStatus {
            is_loading: false,
            has_selected: data.has_selected_phone_type(),
            phone_type: data.phone_type,
        }))
    }
}
