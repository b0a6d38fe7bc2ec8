//! Application state machine.
//!
//! Defines a pure state transition function for startup, authentication and
//! onboarding. Actions that do not apply to the current variant are rejected
//! (`None`), which makes duplicate or out-of-order dispatches harmless.

use std::sync::Arc;

use crate::error::{AppError, ErrorCode};
use crate::onboarding::{self, OnboardingStep};
use crate::state::{Action, AppState, LoadingPhase};
use crate::user::{Session, UserData};

/// Pure application state machine.
///
/// 纯状态机：不包含副作用。
pub struct AppStateMachine;

impl AppStateMachine {
    /// Compute the next state, or `None` if `action` is inapplicable to `state`.
    pub fn transition(state: &AppState, action: &Action) -> Option<AppState> {
        match (state, action) {
            (AppState::Unauthenticated, Action::Logout) => None,
            (_, Action::Logout) => Some(AppState::Unauthenticated),

            // ===== Loading =====
            (
                AppState::Loading {
                    phase: LoadingPhase::CheckingStorage,
                    session,
                    ..
                },
                Action::StorageChecked { has_key_store },
            ) => Some(AppState::loading(
                LoadingPhase::InitializingDb,
                Some(*has_key_store),
                session.clone(),
            )),
            (
                AppState::Loading {
                    phase: LoadingPhase::InitializingDb,
                    has_key_store,
                    session,
                },
                Action::DbInitComplete { success, error },
            ) => {
                if *success {
                    Some(AppState::loading(
                        LoadingPhase::LoadingAuth,
                        *has_key_store,
                        session.clone(),
                    ))
                } else {
                    let error = error.clone().unwrap_or_else(|| {
                        AppError::new(
                            ErrorCode::DatabaseInitError,
                            "database initialization failed",
                        )
                    });
                    Some(AppState::Error {
                        error,
                        failed_phase: Some(LoadingPhase::InitializingDb),
                        has_key_store: *has_key_store,
                        session: session.clone(),
                    })
                }
            }
            (
                AppState::Loading {
                    phase: LoadingPhase::LoadingAuth,
                    has_key_store,
                    ..
                },
                Action::AuthLoaded {
                    session,
                    is_new_user,
                    user_data,
                },
            ) => match session {
                None => Some(AppState::Unauthenticated),
                Some(session) if *is_new_user => Some(onboard_new_user(
                    session.clone(),
                    user_data.clone(),
                    *has_key_store,
                )),
                Some(session) => Some(AppState::loading(
                    LoadingPhase::LoadingUserData,
                    *has_key_store,
                    Some(session.clone()),
                )),
            },
            (
                AppState::Loading {
                    phase: LoadingPhase::LoadingUserData,
                    has_key_store,
                    session: Some(session),
                },
                Action::UserDataLoaded { data },
            ) => Some(settle(session.clone(), data.clone(), *has_key_store)),
            (
                AppState::Loading {
                    phase,
                    has_key_store,
                    session,
                },
                Action::ProbeFailed {
                    phase: failed,
                    error,
                },
            ) if phase == failed => Some(AppState::Error {
                error: error.clone(),
                failed_phase: Some(*failed),
                has_key_store: *has_key_store,
                session: session.clone(),
            }),

            // ===== Login =====
            (
                AppState::Unauthenticated,
                Action::LoginSuccess {
                    session,
                    is_new_user,
                    user_data,
                    has_key_store,
                },
            ) => {
                if *is_new_user {
                    return Some(onboard_new_user(
                        session.clone(),
                        user_data.clone(),
                        *has_key_store,
                    ));
                }
                match user_data {
                    Some(data) => Some(settle(session.clone(), data.clone(), *has_key_store)),
                    None => Some(AppState::loading(
                        LoadingPhase::LoadingUserData,
                        *has_key_store,
                        Some(session.clone()),
                    )),
                }
            }

            // ===== Onboarding =====
            (
                AppState::Onboarding {
                    step,
                    session,
                    data,
                    has_key_store,
                },
                Action::OnboardingStepComplete {
                    step: completed,
                    phone_type,
                },
            ) if step == completed => {
                let data = onboarding::record_completion(*step, *phone_type, data)?;
                Some(advance(*step, session.clone(), data, *has_key_store))
            }
            (
                AppState::Onboarding {
                    step,
                    session,
                    data,
                    has_key_store,
                },
                Action::OnboardingSkip { step: skipped },
            ) if step == skipped => {
                let data = onboarding::record_skip(*step, data)?;
                Some(advance(*step, session.clone(), data, *has_key_store))
            }
            (
                AppState::Onboarding {
                    session,
                    data,
                    has_key_store,
                    ..
                },
                Action::AppReady,
            ) if onboarding::is_onboarding_complete(session.platform, data) => {
                Some(AppState::Ready {
                    session: session.clone(),
                    data: data.clone(),
                    has_key_store: *has_key_store,
                })
            }

            // ===== Error =====
            (
                AppState::Error {
                    failed_phase,
                    has_key_store,
                    session,
                    ..
                },
                Action::Retry,
            ) => Some(AppState::loading(
                failed_phase.unwrap_or(LoadingPhase::CheckingStorage),
                *has_key_store,
                session.clone(),
            )),

            _ => None,
        }
    }
}

/// Apply `action` to a shared state.
///
/// Returns the same `Arc` when the action is ignored, so callers can detect a
/// no-op with `Arc::ptr_eq`.
pub fn reduce(state: &Arc<AppState>, action: &Action) -> Arc<AppState> {
    match AppStateMachine::transition(state, action) {
        Some(next) => Arc::new(next),
        None => Arc::clone(state),
    }
}

/// A new user starts at the first visible step, or resumes stored progress.
fn onboard_new_user(
    session: Session,
    user_data: Option<UserData>,
    has_key_store: Option<bool>,
) -> AppState {
    match user_data {
        Some(data) => settle(session, data, has_key_store),
        None => {
            let data = UserData::default();
            let step = onboarding::next_pending_step(None, session.platform, &data);
            at_step(step, session, data, has_key_store)
        }
    }
}

fn settle(session: Session, data: UserData, has_key_store: Option<bool>) -> AppState {
    let step = onboarding::first_incomplete_step(session.platform, &data);
    at_step(step, session, data, has_key_store)
}

fn advance(
    from: OnboardingStep,
    session: Session,
    data: UserData,
    has_key_store: Option<bool>,
) -> AppState {
    let step = onboarding::next_pending_step(Some(from), session.platform, &data);
    at_step(step, session, data, has_key_store)
}

fn at_step(
    step: Option<OnboardingStep>,
    session: Session,
    data: UserData,
    has_key_store: Option<bool>,
) -> AppState {
    match step {
        Some(step) => AppState::Onboarding {
            step,
            session,
            data,
            has_key_store,
        },
        None => AppState::Ready {
            session,
            data,
            has_key_store,
        },
    }
}
