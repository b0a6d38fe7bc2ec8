use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AppError, ErrorCode};
use crate::onboarding::OnboardingStep;
use crate::user::{Session, UserData};

/// Sub-stage of `AppState::Loading`, one per external probe.
///
/// Phases are ordered; within one loading lifetime they only move forward.
///
/// 加载阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadingPhase {
    CheckingStorage,
    InitializingDb,
    LoadingAuth,
    LoadingUserData,
}

impl LoadingPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadingPhase::CheckingStorage => "checking-storage",
            LoadingPhase::InitializingDb => "initializing-db",
            LoadingPhase::LoadingAuth => "loading-auth",
            LoadingPhase::LoadingUserData => "loading-user-data",
        }
    }

    /// Error code reported when this phase's probe fails.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            LoadingPhase::CheckingStorage => ErrorCode::StorageError,
            LoadingPhase::InitializingDb => ErrorCode::DatabaseInitError,
            LoadingPhase::LoadingAuth => ErrorCode::AuthLoadError,
            LoadingPhase::LoadingUserData => ErrorCode::UserDataLoadError,
        }
    }
}

impl fmt::Display for LoadingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application state. Exactly one variant is active at any time.
///
/// 应用状态（标签联合）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AppState {
    /// No session; the login screen is shown.
    Unauthenticated,
    /// Startup probes in progress.
    Loading {
        phase: LoadingPhase,
        /// Result of the storage probe, once known.
        has_key_store: Option<bool>,
        /// Present from `loading-user-data` on.
        session: Option<Session>,
    },
    /// A gating setup screen is shown.
    Onboarding {
        step: OnboardingStep,
        session: Session,
        data: UserData,
        /// Storage probe result carried over from `Loading`.
        #[serde(default)]
        has_key_store: Option<bool>,
    },
    /// Startup and onboarding complete.
    Ready {
        session: Session,
        data: UserData,
        #[serde(default)]
        has_key_store: Option<bool>,
    },
    /// A probe failed. Terminal until `Retry`.
    Error {
        error: AppError,
        failed_phase: Option<LoadingPhase>,
        has_key_store: Option<bool>,
        session: Option<Session>,
    },
}

impl AppState {
    /// State at process start.
    pub fn boot() -> Self {
        Self::loading(LoadingPhase::CheckingStorage, None, None)
    }

    pub fn loading(
        phase: LoadingPhase,
        has_key_store: Option<bool>,
        session: Option<Session>,
    ) -> Self {
        AppState::Loading {
            phase,
            has_key_store,
            session,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AppState::Unauthenticated => "unauthenticated",
            AppState::Loading { .. } => "loading",
            AppState::Onboarding { .. } => "onboarding",
            AppState::Ready { .. } => "ready",
            AppState::Error { .. } => "error",
        }
    }

    pub fn phase(&self) -> Option<LoadingPhase> {
        match self {
            AppState::Loading { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AppState::Loading { session, .. } | AppState::Error { session, .. } => {
                session.as_ref()
            }
            AppState::Onboarding { session, .. } | AppState::Ready { session, .. } => {
                Some(session)
            }
            AppState::Unauthenticated => None,
        }
    }

    pub fn user_data(&self) -> Option<&UserData> {
        match self {
            AppState::Onboarding { data, .. } | AppState::Ready { data, .. } => Some(data),
            _ => None,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::boot()
    }
}
