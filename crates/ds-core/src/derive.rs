//! Step and navigation derivation.
//!
//! Pure functions recomputed on every render. Nothing here dispatches or
//! navigates; the render layer reads the result and shows exactly one screen.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::onboarding::{self, OnboardingStep};
use crate::platform::{PhoneType, Platform};
use crate::state::{AppState, LoadingPhase};

/// Top-level screen the render layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Loading,
    Login,
    Onboarding,
    Dashboard,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<LoadingPhase>,
    /// `None` on the onboarding screen means "render nothing".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<OnboardingStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AppError>,
}

/// Render target derived from state.
///
/// 由状态推导出的渲染目标。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationTarget {
    pub screen: Screen,
    pub params: NavigationParams,
}

impl NavigationTarget {
    fn screen(screen: Screen) -> Self {
        Self {
            screen,
            params: NavigationParams::default(),
        }
    }
}

/// Current onboarding step, if onboarding is active.
pub fn derive_current_step(state: &AppState) -> Option<OnboardingStep> {
    match state {
        AppState::Onboarding { step, .. } => Some(*step),
        _ => None,
    }
}

/// Next visible step after `current` in canonical order.
///
/// `current = None` yields the first visible step. Returns `None` when the
/// walk is exhausted, i.e. onboarding is complete.
pub fn derive_next_step(
    current: Option<OnboardingStep>,
    platform: Platform,
    phone_type: Option<PhoneType>,
) -> Option<OnboardingStep> {
    OnboardingStep::ALL
        .into_iter()
        .filter(|step| current.map_or(true, |current| *step > current))
        .find(|step| step.is_visible(platform, phone_type))
}

/// All visible steps for the given platform and phone type, in order.
pub fn derive_visible_steps(
    platform: Platform,
    phone_type: Option<PhoneType>,
) -> Vec<OnboardingStep> {
    OnboardingStep::ALL
        .into_iter()
        .filter(|step| step.is_visible(platform, phone_type))
        .collect()
}

/// Steps still to be shown from the current one on (inclusive).
pub fn derive_remaining_steps(state: &AppState) -> Vec<OnboardingStep> {
    let AppState::Onboarding {
        step,
        session,
        data,
        ..
    } = state
    else {
        return Vec::new();
    };

    let mut remaining = Vec::new();
    let mut cursor = Some(*step).filter(|step| {
        step.is_visible(session.platform, data.phone_type)
            && (!step.gates_readiness() || !step.is_satisfied(data))
    });
    if cursor.is_none() {
        cursor = onboarding::next_pending_step(Some(*step), session.platform, data);
    }
    while let Some(step) = cursor {
        remaining.push(step);
        cursor = onboarding::next_pending_step(Some(step), session.platform, data);
    }
    remaining
}

/// Onboarding step to paint, or `None` to paint nothing.
///
/// When the set of remaining visible steps is empty (or the current step is
/// not visible for this platform/phone), the render layer shows nothing while
/// `AppReady` moves the machine to `Ready`. A returning user therefore never
/// sees a step that is about to be skipped.
pub fn derive_onboarding_render(state: &AppState) -> Option<OnboardingStep> {
    let AppState::Onboarding { step, .. } = state else {
        return None;
    };
    derive_remaining_steps(state)
        .first()
        .copied()
        .filter(|first| first == step)
}

/// Map each state variant to exactly one render target.
pub fn derive_navigation_target(state: &AppState) -> NavigationTarget {
    match state {
        AppState::Loading { phase, .. } => NavigationTarget {
            screen: Screen::Loading,
            params: NavigationParams {
                phase: Some(*phase),
                ..NavigationParams::default()
            },
        },
        AppState::Unauthenticated => NavigationTarget::screen(Screen::Login),
        AppState::Onboarding { .. } => NavigationTarget {
            screen: Screen::Onboarding,
            params: NavigationParams {
                step: derive_onboarding_render(state),
                ..NavigationParams::default()
            },
        },
        AppState::Ready { .. } => NavigationTarget::screen(Screen::Dashboard),
        AppState::Error { error, .. } => NavigationTarget {
            screen: Screen::Error,
            params: NavigationParams {
                error: Some(error.clone()),
                ..NavigationParams::default()
            },
        },
    }
}

/// True if `Ready`, or if `step` precedes the current onboarding step.
pub fn is_step_complete(step: OnboardingStep, state: &AppState) -> bool {
    match state {
        AppState::Ready { .. } => true,
        AppState::Onboarding { step: current, .. } => step < *current,
        _ => false,
    }
}
