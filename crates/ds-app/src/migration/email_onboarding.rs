use std::sync::{Arc, Mutex};

use serde::Serialize;

use ds_core::{
    onboarding::OnboardingStep,
    selectors::{select_has_completed_email_onboarding, select_is_loading},
    state::AppState,
    user::UserData,
};

use super::{AdapterError, LegacyProfile, MachineAccess};
use crate::usecases::LoadingPorts;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmailOnboardingStatus {
    pub is_loading: bool,
    pub has_completed: bool,
    pub is_connected: bool,
}

impl EmailOnboardingStatus {
    fn from_state(state: &AppState) -> Self {
        Self {
            is_loading: select_is_loading(state),
            has_completed: select_has_completed_email_onboarding(state),
            is_connected: state.user_data().map_or(false, |data| data.email_connected),
        }
    }

    fn from_data(data: &UserData) -> Self {
        Self {
            is_loading: false,
            has_completed: data.has_completed_email_onboarding(),
            is_connected: data.email_connected,
        }
    }
}

/// Email-connect onboarding.
pub enum EmailOnboardingAdapter {
    Machine(MachineAccess),
    Legacy(LegacyEmailOnboarding),
}

impl EmailOnboardingAdapter {
    pub fn new(machine: Option<MachineAccess>, ports: LoadingPorts) -> Self {
        match machine {
            Some(machine) => EmailOnboardingAdapter::Machine(machine),
            None => EmailOnboardingAdapter::Legacy(LegacyEmailOnboarding {
                profile: LegacyProfile::new(ports),
                status: Mutex::new(EmailOnboardingStatus::default()),
            }),
        }
    }

    pub fn machine_state(&self) -> Option<Arc<AppState>> {
        match self {
            EmailOnboardingAdapter::Machine(machine) => Some(machine.state()),
            EmailOnboardingAdapter::Legacy(_) => None,
        }
    }

    pub fn status(&self) -> EmailOnboardingStatus {
        match self {
            EmailOnboardingAdapter::Machine(machine) => {
                EmailOnboardingStatus::from_state(&machine.state())
            }
            EmailOnboardingAdapter::Legacy(legacy) => legacy.snapshot(),
        }
    }

    pub async fn refresh(&self) -> Result<EmailOnboardingStatus, AdapterError> {
        match self {
            EmailOnboardingAdapter::Machine(machine) => {
                let state = machine.orchestrator().drive().await;
                Ok(EmailOnboardingStatus::from_state(&state))
            }
            EmailOnboardingAdapter::Legacy(legacy) => legacy.refresh().await,
        }
    }

    /// The user connected an email account.
    pub async fn complete(&self) -> Result<EmailOnboardingStatus, AdapterError> {
        match self {
            EmailOnboardingAdapter::Machine(machine) => {
                let outcome = machine
                    .orchestrator()
                    .complete_onboarding_step(OnboardingStep::EmailConnect, None)
                    .await?;
                Ok(EmailOnboardingStatus::from_state(outcome.state()))
            }
            EmailOnboardingAdapter::Legacy(legacy) => {
                legacy
                    .persist(|data| {
                        data.email_connected = true;
                        data.email_onboarding_completed = true;
                    })
                    .await
            }
        }
    }

    /// The user declined to connect an email account.
    pub async fn skip(&self) -> Result<EmailOnboardingStatus, AdapterError> {
        match self {
            EmailOnboardingAdapter::Machine(machine) => {
                let outcome = machine
                    .orchestrator()
                    .skip_onboarding_step(OnboardingStep::EmailConnect)
                    .await?;
                Ok(EmailOnboardingStatus::from_state(outcome.state()))
            }
            EmailOnboardingAdapter::Legacy(legacy) => {
                legacy
                    .persist(|data| data.email_onboarding_completed = true)
                    .await
            }
        }
    }
}

pub struct LegacyEmailOnboarding {
    profile: LegacyProfile,
    status: Mutex<EmailOnboardingStatus>,
}

impl LegacyEmailOnboarding {
    fn snapshot(&self) -> EmailOnboardingStatus {
        match self.status.lock() {
            Ok(status) => status.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, next: EmailOnboardingStatus) -> EmailOnboardingStatus {
        let mut status = match self.status.lock() {
            Ok(status) => status,
            Err(poisoned) => poisoned.into_inner(),
        };
        *status = next.clone();
        next
    }

    async fn refresh(&self) -> Result<EmailOnboardingStatus, AdapterError> {
        self.replace(EmailOnboardingStatus {
            is_loading: true,
            ..self.snapshot()
        });
        match self.profile.load().await {
            Ok(Some((_, data))) => Ok(self.replace(EmailOnboardingStatus::from_data(&data))),
            Ok(None) => Ok(self.replace(EmailOnboardingStatus::default())),
            Err(err) => {
                self.replace(EmailOnboardingStatus {
                    is_loading: false,
                    ..self.snapshot()
                });
                Err(err)
            }
        }
    }

    async fn persist(
        &self,
        change: impl FnOnce(&mut UserData),
    ) -> Result<EmailOnboardingStatus, AdapterError> {
        let data = self.profile.update(change).await?;
        Ok(self.replace(EmailOnboardingStatus::from_data(&data)))
    }
}
