use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::onboarding::OnboardingStep;
use crate::platform::PhoneType;
use crate::state::LoadingPhase;
use crate::user::{Session, UserData};

/// Events that drive the application state.
///
/// 驱动应用状态的事件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Storage probe finished.
    StorageChecked { has_key_store: bool },
    /// Database initialization finished.
    DbInitComplete {
        success: bool,
        error: Option<AppError>,
    },
    /// Persisted auth session loaded (`None` when signed out).
    ///
    /// For a new user `user_data` seeds onboarding with any stored progress.
    AuthLoaded {
        session: Option<Session>,
        is_new_user: bool,
        #[serde(default)]
        user_data: Option<UserData>,
    },
    /// Interactive login finished.
    ///
    /// `user_data` may be attached when the login response already carried
    /// the profile; a complete profile then goes straight to `Ready`.
    /// `has_key_store` is the storage probe taken at sign-in, if any.
    LoginSuccess {
        session: Session,
        is_new_user: bool,
        user_data: Option<UserData>,
        #[serde(default)]
        has_key_store: Option<bool>,
    },
    /// User profile loaded.
    UserDataLoaded { data: UserData },
    /// The user finished the given step. `phone_type` carries the selection
    /// when the step is `phone-type`.
    OnboardingStepComplete {
        step: OnboardingStep,
        phone_type: Option<PhoneType>,
    },
    OnboardingSkip { step: OnboardingStep },
    /// Render layer found nothing left to show.
    AppReady,
    Logout,
    Retry,
    /// Storage, auth or user-data probe failed.
    ProbeFailed {
        phase: LoadingPhase,
        error: AppError,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::StorageChecked { .. } => "STORAGE_CHECKED",
            Action::DbInitComplete { .. } => "DB_INIT_COMPLETE",
            Action::AuthLoaded { .. } => "AUTH_LOADED",
            Action::LoginSuccess { .. } => "LOGIN_SUCCESS",
            Action::UserDataLoaded { .. } => "USER_DATA_LOADED",
            Action::OnboardingStepComplete { .. } => "ONBOARDING_STEP_COMPLETE",
            Action::OnboardingSkip { .. } => "ONBOARDING_SKIP",
            Action::AppReady => "APP_READY",
            Action::Logout => "LOGOUT",
            Action::Retry => "RETRY",
            Action::ProbeFailed { .. } => "PROBE_FAILED",
        }
    }

    pub fn db_init_failed(error: AppError) -> Self {
        Action::DbInitComplete {
            success: false,
            error: Some(error),
        }
    }

    pub fn complete_step(step: OnboardingStep) -> Self {
        Action::OnboardingStepComplete {
            step,
            phone_type: None,
        }
    }

    pub fn select_phone_type(phone_type: PhoneType) -> Self {
        Action::OnboardingStepComplete {
            step: OnboardingStep::PhoneType,
            phone_type: Some(phone_type),
        }
    }
}
