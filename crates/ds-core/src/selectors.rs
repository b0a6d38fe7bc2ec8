//! Read-only selectors over `AppState`.
//!
//! Used by the migration adapters so legacy call sites can read plain values
//! without re-implementing derivation. Every selector matches exhaustively and
//! returns a safe default for variants where the question does not apply.

use crate::error::AppError;
use crate::platform::{PhoneType, Platform};
use crate::state::{AppState, LoadingPhase};
use crate::user::User;

pub fn select_is_loading(state: &AppState) -> bool {
    matches!(state, AppState::Loading { .. })
}

pub fn select_loading_phase(state: &AppState) -> Option<LoadingPhase> {
    state.phase()
}

pub fn select_is_checking_secure_storage(state: &AppState) -> bool {
    match state {
        AppState::Loading { phase, .. } => *phase == LoadingPhase::CheckingStorage,
        AppState::Unauthenticated
        | AppState::Onboarding { .. }
        | AppState::Ready { .. }
        | AppState::Error { .. } => false,
    }
}

/// Result of the most recent storage probe for the current session.
pub fn select_has_key_store(state: &AppState) -> Option<bool> {
    match state {
        AppState::Loading { has_key_store, .. }
        | AppState::Onboarding { has_key_store, .. }
        | AppState::Ready { has_key_store, .. }
        | AppState::Error { has_key_store, .. } => *has_key_store,
        AppState::Unauthenticated => None,
    }
}

pub fn select_is_database_initialized(state: &AppState) -> bool {
    match state {
        AppState::Loading { phase, .. } => *phase > LoadingPhase::InitializingDb,
        AppState::Onboarding { .. } | AppState::Ready { .. } => true,
        AppState::Error { failed_phase, .. } => {
            failed_phase.map_or(false, |phase| phase > LoadingPhase::InitializingDb)
        }
        AppState::Unauthenticated => false,
    }
}

pub fn select_is_authenticated(state: &AppState) -> bool {
    match state {
        AppState::Onboarding { .. } | AppState::Ready { .. } => true,
        AppState::Loading { session, .. } | AppState::Error { session, .. } => session.is_some(),
        AppState::Unauthenticated => false,
    }
}

pub fn select_current_user(state: &AppState) -> Option<&User> {
    state.session().map(|session| &session.user)
}

pub fn select_platform(state: &AppState) -> Option<Platform> {
    state.session().map(|session| session.platform)
}

pub fn select_phone_type(state: &AppState) -> Option<PhoneType> {
    match state {
        AppState::Onboarding { data, .. } | AppState::Ready { data, .. } => data.phone_type,
        AppState::Unauthenticated | AppState::Loading { .. } | AppState::Error { .. } => None,
    }
}

pub fn select_has_selected_phone_type(state: &AppState) -> bool {
    select_phone_type(state).is_some()
}

pub fn select_has_completed_email_onboarding(state: &AppState) -> bool {
    match state {
        AppState::Ready { .. } => true,
        AppState::Onboarding { data, .. } => data.has_completed_email_onboarding(),
        AppState::Unauthenticated | AppState::Loading { .. } | AppState::Error { .. } => false,
    }
}

pub fn select_has_completed_secure_storage(state: &AppState) -> bool {
    match state {
        AppState::Ready { .. } => true,
        AppState::Onboarding { session, data, .. } => {
            !session.platform.is_macos() || data.storage_setup_dismissed
        }
        AppState::Unauthenticated | AppState::Loading { .. } | AppState::Error { .. } => false,
    }
}

pub fn select_has_granted_permissions(state: &AppState) -> bool {
    match state {
        AppState::Onboarding { data, .. } | AppState::Ready { data, .. } => {
            data.permissions_granted
        }
        AppState::Unauthenticated | AppState::Loading { .. } | AppState::Error { .. } => false,
    }
}

pub fn select_has_installed_driver(state: &AppState) -> bool {
    match state {
        AppState::Onboarding { data, .. } | AppState::Ready { data, .. } => data.driver_installed,
        AppState::Unauthenticated | AppState::Loading { .. } | AppState::Error { .. } => false,
    }
}

pub fn select_is_onboarding(state: &AppState) -> bool {
    matches!(state, AppState::Onboarding { .. })
}

pub fn select_is_ready(state: &AppState) -> bool {
    matches!(state, AppState::Ready { .. })
}

pub fn select_error(state: &AppState) -> Option<&AppError> {
    match state {
        AppState::Error { error, .. } => Some(error),
        AppState::Unauthenticated
        | AppState::Loading { .. }
        | AppState::Onboarding { .. }
        | AppState::Ready { .. } => None,
    }
}
