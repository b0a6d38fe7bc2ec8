//! Interactive sign-in use case.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, info_span, warn, Instrument};

use ds_core::{
    error::{AppError, ErrorCode},
    ports::{AuthPort, AuthSession, AuthorizationPort},
    state::{Action, AppState},
    user::Session,
};

use crate::usecases::{with_timeout, LoadingOrchestrator};

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("login requires a signed-out state, current state is {0}")]
    NotSignedOut(&'static str),
    #[error("authorization failed: {0}")]
    Authorization(#[source] AppError),
    #[error("persist session failed: {0}")]
    PersistSession(#[source] anyhow::Error),
}

/// Acquire an authorization, store it, and hand the session to the machine.
///
/// Authorization races the network timeout. On failure the machine stays in
/// `Unauthenticated` and the error (possibly `Timeout`) is returned to the
/// login screen.
pub struct LoginFlow {
    orchestrator: Arc<LoadingOrchestrator>,
    authorization: Arc<dyn AuthorizationPort>,
    auth: Arc<dyn AuthPort>,
    timeout: Duration,
}

impl LoginFlow {
    pub fn new(
        orchestrator: Arc<LoadingOrchestrator>,
        authorization: Arc<dyn AuthorizationPort>,
        auth: Arc<dyn AuthPort>,
    ) -> Self {
        let timeout = orchestrator.network_timeout();
        Self {
            orchestrator,
            authorization,
            auth,
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn execute(&self) -> Result<Arc<AppState>, LoginError> {
        let span = info_span!("usecase.login.execute");
        async {
            let state = self.orchestrator.state();
            if !matches!(*state, AppState::Unauthenticated) {
                return Err(LoginError::NotSignedOut(state.name()));
            }

            let auth = with_timeout(
                "authorization",
                self.timeout,
                ErrorCode::AuthLoadError,
                self.authorization.authorize(),
            )
            .await
            .map_err(|err| {
                warn!(code = %err.code, error = %err.message, "authorization failed");
                LoginError::Authorization(err)
            })?;

            // Onboarding progress lives in the profile from here on; later
            // starts load it instead of onboarding from scratch.
            let stored = AuthSession {
                user: auth.user.clone(),
                is_new_user: false,
            };
            self.auth
                .save_session(&stored)
                .await
                .map_err(LoginError::PersistSession)?;

            let platform = self.orchestrator.detect_platform();
            let has_key_store = self.orchestrator.probe_key_store().await;
            info!(user = %auth.user.id, %platform, is_new_user = auth.is_new_user, "login succeeded");

            let state = self
                .orchestrator
                .dispatch_and_drive(Action::LoginSuccess {
                    session: Session::new(auth.user, platform),
                    is_new_user: auth.is_new_user,
                    user_data: None,
                    has_key_store,
                })
                .await;
            Ok(state)
        }
        .instrument(span)
        .await
    }
}
