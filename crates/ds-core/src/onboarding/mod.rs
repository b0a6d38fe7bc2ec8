//! Onboarding domain module.
//!
//! Defines the canonical onboarding step table: order, visibility per
//! platform and phone type, and which persisted flag satisfies each step.

mod step;

pub use step::OnboardingStep;

use crate::platform::{PhoneType, Platform};
use crate::user::UserData;

/// First visible gating step the user has not satisfied yet.
///
/// `None` means the persisted data already covers every step the user has to
/// pass on this platform, i.e. onboarding is complete.
pub fn first_incomplete_step(platform: Platform, data: &UserData) -> Option<OnboardingStep> {
    OnboardingStep::ALL.into_iter().find(|step| {
        step.is_visible(platform, data.phone_type)
            && step.gates_readiness()
            && !step.is_satisfied(data)
    })
}

/// Next step to show after `after` (or from the start when `None`).
///
/// Visible informational steps are always shown; gating steps are shown only
/// while unsatisfied.
pub fn next_pending_step(
    after: Option<OnboardingStep>,
    platform: Platform,
    data: &UserData,
) -> Option<OnboardingStep> {
    OnboardingStep::ALL
        .into_iter()
        .filter(|step| after.map_or(true, |after| *step > after))
        .find(|step| {
            step.is_visible(platform, data.phone_type)
                && (!step.gates_readiness() || !step.is_satisfied(data))
        })
}

/// Whether `data` satisfies every visible gating step on `platform`.
pub fn is_onboarding_complete(platform: Platform, data: &UserData) -> bool {
    first_incomplete_step(platform, data).is_none()
}

/// Apply the completion of `step` to `data`.
///
/// Returns `None` when the completion carries insufficient information
/// (completing `phone-type` without a selection).
pub fn record_completion(
    step: OnboardingStep,
    phone_type: Option<PhoneType>,
    data: &UserData,
) -> Option<UserData> {
    let mut next = data.clone();
    match step {
        OnboardingStep::PhoneType => next.phone_type = Some(phone_type?),
        OnboardingStep::SecureStorage => next.storage_setup_dismissed = true,
        OnboardingStep::AppleDriver => next.driver_installed = true,
        OnboardingStep::EmailConnect => {
            next.email_connected = true;
            next.email_onboarding_completed = true;
        }
        OnboardingStep::Permissions => next.permissions_granted = true,
        OnboardingStep::AndroidComingSoon => {}
    }
    Some(next)
}

/// Apply a skip of `step` to `data`.
///
/// Skipping email onboarding records it as finished without a connection.
/// Skipping the driver step records nothing, so it is offered again on the
/// next start. Returns `None` for steps that cannot be skipped.
pub fn record_skip(step: OnboardingStep, data: &UserData) -> Option<UserData> {
    if !step.is_skippable() {
        return None;
    }
    let mut next = data.clone();
    if step == OnboardingStep::EmailConnect {
        next.email_onboarding_completed = true;
    }
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_macos_data() -> UserData {
        UserData {
            phone_type: Some(PhoneType::IPhone),
            storage_setup_dismissed: true,
            email_onboarding_completed: true,
            email_connected: true,
            permissions_granted: true,
            driver_installed: false,
        }
    }

    #[test]
    fn first_incomplete_step_is_none_for_complete_macos_user() {
        assert_eq!(
            first_incomplete_step(Platform::MacOS, &complete_macos_data()),
            None
        );
    }

    #[test]
    fn driver_flag_matters_only_on_windows_with_iphone() {
        let data = complete_macos_data();
        assert_eq!(
            first_incomplete_step(Platform::Windows, &data),
            Some(OnboardingStep::AppleDriver)
        );

        let android = UserData {
            phone_type: Some(PhoneType::Android),
            ..data
        };
        assert_eq!(first_incomplete_step(Platform::Windows, &android), None);
    }

    #[test]
    fn missing_phone_type_starts_at_phone_type_step() {
        let data = UserData {
            phone_type: None,
            ..complete_macos_data()
        };
        assert_eq!(
            first_incomplete_step(Platform::MacOS, &data),
            Some(OnboardingStep::PhoneType)
        );
    }

    #[test]
    fn android_notice_is_shown_but_does_not_gate() {
        let data = UserData {
            phone_type: Some(PhoneType::Android),
            email_connected: true,
            ..UserData::default()
        };
        assert!(is_onboarding_complete(Platform::Linux, &data));
        assert_eq!(
            next_pending_step(Some(OnboardingStep::EmailConnect), Platform::Linux, &data),
            Some(OnboardingStep::AndroidComingSoon)
        );
    }

    #[test]
    fn completing_phone_type_requires_selection() {
        let data = UserData::default();
        assert_eq!(record_completion(OnboardingStep::PhoneType, None, &data), None);

        let next =
            record_completion(OnboardingStep::PhoneType, Some(PhoneType::IPhone), &data).unwrap();
        assert_eq!(next.phone_type, Some(PhoneType::IPhone));
    }

    #[test]
    fn skipping_email_marks_onboarding_done_without_connection() {
        let next = record_skip(OnboardingStep::EmailConnect, &UserData::default()).unwrap();
        assert!(next.email_onboarding_completed);
        assert!(!next.email_connected);
    }

    #[test]
    fn permissions_cannot_be_skipped() {
        assert_eq!(record_skip(OnboardingStep::Permissions, &UserData::default()), None);
        assert_eq!(record_skip(OnboardingStep::PhoneType, &UserData::default()), None);
    }
}
