//! Loading orchestrator.
//!
//! This module drives the `Loading` phases: for each phase it issues exactly
//! one probe to an external collaborator and dispatches the result into the
//! state store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, info_span, warn, Instrument};

use ds_core::{
    derive::derive_onboarding_render,
    error::{AppError, ErrorCode},
    onboarding::OnboardingStep,
    platform::{PhoneType, Platform},
    ports::{AuthPort, DatabasePort, PlatformProbePort, StorageProbePort, UserDataPort},
    state::{Action, AppState, LoadingPhase},
    user::Session,
};

use crate::store::{DispatchOutcome, StateStore};
use crate::usecases::with_timeout;

/// Errors produced by the loading orchestrator's side effects.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("persist onboarding progress failed: {0}")]
    PersistProgress(#[source] anyhow::Error),
    #[error("clear session failed: {0}")]
    ClearSession(#[source] anyhow::Error),
}

/// External collaborators probed during startup.
#[derive(Clone)]
pub struct LoadingPorts {
    pub storage: Arc<dyn StorageProbePort>,
    pub database: Arc<dyn DatabasePort>,
    pub auth: Arc<dyn AuthPort>,
    pub user_data: Arc<dyn UserDataPort>,
    pub platform: Arc<dyn PlatformProbePort>,
}

/// Identifies the one legitimate in-flight probe.
///
/// A probe result is dispatched only while its token is still current: same
/// generation (no logout or reboot since it was issued) and the store still in
/// the same phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeToken {
    pub generation: u64,
    pub phase: LoadingPhase,
}

/// Orchestrator that drives loading phases and their probes.
pub struct LoadingOrchestrator {
    store: Arc<StateStore>,
    ports: LoadingPorts,
    network_timeout: Duration,
    generation: AtomicU64,
    in_flight: Mutex<Option<ProbeToken>>,
}

impl LoadingOrchestrator {
    pub fn new(store: Arc<StateStore>, ports: LoadingPorts, network_timeout: Duration) -> Self {
        Self {
            store,
            ports,
            network_timeout,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn state(&self) -> Arc<AppState> {
        self.store.snapshot()
    }

    pub fn network_timeout(&self) -> Duration {
        self.network_timeout
    }

    pub fn detect_platform(&self) -> Platform {
        self.ports.platform.detect()
    }

    /// Storage probe outside of loading. `None` when the probe fails.
    pub async fn probe_key_store(&self) -> Option<bool> {
        match self.ports.storage.has_key_store().await {
            Ok(has_key_store) => Some(has_key_store),
            Err(err) => {
                warn!(error = %err, "key-store check failed");
                None
            }
        }
    }

    /// Start from `Loading{checking-storage}` and drive until a non-loading state.
    pub async fn boot(&self) -> Arc<AppState> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.store.reset(AppState::boot());
        self.drive().await
    }

    /// Run probes while the state is `Loading`.
    ///
    /// Returns immediately if the current phase already has a probe in flight.
    pub async fn drive(&self) -> Arc<AppState> {
        loop {
            let state = self.store.snapshot();
            let Some(phase) = state.phase() else {
                return state;
            };

            let token = ProbeToken {
                generation: self.generation.load(Ordering::SeqCst),
                phase,
            };
            if !self.try_claim(token) {
                debug!(phase = %phase, "probe already in flight, not issuing another");
                return state;
            }

            let span = info_span!("usecase.loading.probe", phase = %phase, generation = token.generation);
            let action = self.run_probe(phase, &state).instrument(span).await;
            self.release(token);

            let guarded = self
                .store
                .dispatch_if(&action, |current| self.is_current(token, current));
            let Some(outcome) = guarded else {
                debug!(
                    phase = %phase,
                    action = action.name(),
                    "discarding stale probe result"
                );
                return self.store.snapshot();
            };
            if !outcome.is_applied() {
                return outcome.into_state();
            }
        }
    }

    /// Dispatch an external event.
    ///
    /// `Logout` also invalidates every in-flight probe.
    pub fn dispatch(&self, action: Action) -> DispatchOutcome {
        if matches!(action, Action::Logout) {
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        self.store.dispatch(&action)
    }

    /// Dispatch, then keep driving if the action entered a loading phase.
    pub async fn dispatch_and_drive(&self, action: Action) -> Arc<AppState> {
        let outcome = self.dispatch(action);
        if outcome.is_applied() && outcome.state().phase().is_some() {
            return self.drive().await;
        }
        outcome.into_state()
    }

    /// Re-attempt the phase that failed. No-op outside `Error`.
    pub async fn retry(&self) -> Arc<AppState> {
        self.dispatch_and_drive(Action::Retry).await
    }

    /// Reset to `Unauthenticated` and forget the persisted session.
    pub async fn logout(&self) -> Result<Arc<AppState>, OrchestratorError> {
        let state = self.dispatch(Action::Logout).into_state();
        self.ports
            .auth
            .clear_session()
            .await
            .map_err(OrchestratorError::ClearSession)?;
        Ok(state)
    }

    /// Complete the current onboarding step and persist the updated flags.
    ///
    /// The transition is applied before the save. On `PersistProgress` the
    /// in-memory state has already advanced; the stored profile keeps the
    /// previous flags, so the step is offered again on the next start.
    pub async fn complete_onboarding_step(
        &self,
        step: OnboardingStep,
        phone_type: Option<PhoneType>,
    ) -> Result<DispatchOutcome, OrchestratorError> {
        let outcome = self.dispatch(Action::OnboardingStepComplete { step, phone_type });
        self.persist_progress(&outcome).await?;
        Ok(outcome)
    }

    /// Skip the current onboarding step and persist the updated flags.
    ///
    /// Same ordering as [`Self::complete_onboarding_step`].
    pub async fn skip_onboarding_step(
        &self,
        step: OnboardingStep,
    ) -> Result<DispatchOutcome, OrchestratorError> {
        let outcome = self.dispatch(Action::OnboardingSkip { step });
        self.persist_progress(&outcome).await?;
        Ok(outcome)
    }

    /// Render-layer hook: when onboarding has nothing left to paint, advance
    /// to `Ready` instead of showing a transient step.
    pub fn settle_onboarding(&self) -> Arc<AppState> {
        let state = self.store.snapshot();
        if matches!(*state, AppState::Onboarding { .. }) && derive_onboarding_render(&state).is_none()
        {
            return self.dispatch(Action::AppReady).into_state();
        }
        state
    }

    async fn persist_progress(&self, outcome: &DispatchOutcome) -> Result<(), OrchestratorError> {
        let DispatchOutcome::Applied(state) = outcome else {
            return Ok(());
        };
        let (Some(session), Some(data)) = (state.session(), state.user_data()) else {
            return Ok(());
        };
        self.ports
            .user_data
            .save(&session.user.id, data)
            .await
            .map_err(OrchestratorError::PersistProgress)
    }

    async fn run_probe(&self, phase: LoadingPhase, state: &AppState) -> Action {
        match phase {
            LoadingPhase::CheckingStorage => match self.ports.storage.has_key_store().await {
                Ok(has_key_store) => {
                    info!(has_key_store, "storage probe completed");
                    Action::StorageChecked { has_key_store }
                }
                Err(err) => probe_failed(phase, format!("key-store check failed: {err:#}")),
            },
            LoadingPhase::InitializingDb => match self.ports.database.initialize().await {
                Ok(()) => {
                    info!("database initialized");
                    Action::DbInitComplete {
                        success: true,
                        error: None,
                    }
                }
                Err(err) => {
                    warn!(error = %err, "database initialization failed");
                    Action::db_init_failed(AppError::new(
                        ErrorCode::DatabaseInitError,
                        format!("database initialization failed: {err:#}"),
                    ))
                }
            },
            LoadingPhase::LoadingAuth => {
                let loaded = with_timeout(
                    "auth session load",
                    self.network_timeout,
                    ErrorCode::AuthLoadError,
                    self.ports.auth.load_session(),
                )
                .await;
                match loaded {
                    Ok(Some(auth)) => {
                        let platform = self.ports.platform.detect();
                        info!(user = %auth.user.id, %platform, is_new_user = auth.is_new_user, "auth session loaded");
                        let user_data = if auth.is_new_user {
                            let progress = with_timeout(
                                "user data load",
                                self.network_timeout,
                                ErrorCode::UserDataLoadError,
                                self.ports.user_data.load(&auth.user.id),
                            )
                            .await;
                            match progress {
                                Ok(data) => Some(data),
                                Err(error) => return Action::ProbeFailed { phase, error },
                            }
                        } else {
                            None
                        };
                        Action::AuthLoaded {
                            session: Some(Session::new(auth.user, platform)),
                            is_new_user: auth.is_new_user,
                            user_data,
                        }
                    }
                    Ok(None) => {
                        info!("no stored auth session");
                        Action::AuthLoaded {
                            session: None,
                            is_new_user: false,
                            user_data: None,
                        }
                    }
                    Err(error) => Action::ProbeFailed { phase, error },
                }
            }
            LoadingPhase::LoadingUserData => {
                let Some(session) = state.session() else {
                    return Action::ProbeFailed {
                        phase,
                        error: AppError::unknown("user data requested without a session"),
                    };
                };
                let loaded = with_timeout(
                    "user data load",
                    self.network_timeout,
                    ErrorCode::UserDataLoadError,
                    self.ports.user_data.load(&session.user.id),
                )
                .await;
                match loaded {
                    Ok(data) => Action::UserDataLoaded { data },
                    Err(error) => Action::ProbeFailed { phase, error },
                }
            }
        }
    }

    fn try_claim(&self, token: ProbeToken) -> bool {
        let mut in_flight = match self.in_flight.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *in_flight == Some(token) {
            return false;
        }
        *in_flight = Some(token);
        true
    }

    fn release(&self, token: ProbeToken) {
        let mut in_flight = match self.in_flight.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *in_flight == Some(token) {
            *in_flight = None;
        }
    }

    fn is_current(&self, token: ProbeToken, state: &AppState) -> bool {
        token.generation == self.generation.load(Ordering::SeqCst)
            && state.phase() == Some(token.phase)
    }
}

fn probe_failed(phase: LoadingPhase, message: String) -> Action {
    warn!(phase = %phase, %message, "probe failed");
    Action::ProbeFailed {
        phase,
        error: AppError::new(phase.error_code(), message),
    }
}
