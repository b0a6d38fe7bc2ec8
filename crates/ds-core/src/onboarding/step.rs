use serde::{Deserialize, Serialize};
use std::fmt;

use crate::platform::{PhoneType, Platform};
use crate::user::UserData;

/// Onboarding steps in canonical order.
///
/// The derived `Ord` is the walk order used by every derivation:
/// `phone-type → secure-storage → apple-driver → email-connect → permissions
/// → android-coming-soon`.
///
/// `apple-driver` comes before `email-connect`, not after `permissions`: a
/// Windows iPhone user goes from `phone-type` straight to the driver screen.
///
/// 引导步骤（按规范顺序）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnboardingStep {
    PhoneType,
    /// macOS only.
    SecureStorage,
    /// Windows with an iPhone only.
    AppleDriver,
    EmailConnect,
    /// macOS only.
    Permissions,
    /// Android phones only. Informational.
    AndroidComingSoon,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 6] = [
        OnboardingStep::PhoneType,
        OnboardingStep::SecureStorage,
        OnboardingStep::AppleDriver,
        OnboardingStep::EmailConnect,
        OnboardingStep::Permissions,
        OnboardingStep::AndroidComingSoon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStep::PhoneType => "phone-type",
            OnboardingStep::SecureStorage => "secure-storage",
            OnboardingStep::AppleDriver => "apple-driver",
            OnboardingStep::EmailConnect => "email-connect",
            OnboardingStep::Permissions => "permissions",
            OnboardingStep::AndroidComingSoon => "android-coming-soon",
        }
    }

    /// Visibility predicate over platform and selected phone type.
    ///
    /// Steps that depend on the phone type stay hidden until one is selected.
    pub fn is_visible(&self, platform: Platform, phone_type: Option<PhoneType>) -> bool {
        match self {
            OnboardingStep::PhoneType | OnboardingStep::EmailConnect => true,
            OnboardingStep::SecureStorage | OnboardingStep::Permissions => platform.is_macos(),
            OnboardingStep::AppleDriver => {
                platform.is_windows() && phone_type == Some(PhoneType::IPhone)
            }
            OnboardingStep::AndroidComingSoon => phone_type == Some(PhoneType::Android),
        }
    }

    /// Whether the persisted flags already cover this step.
    pub fn is_satisfied(&self, data: &UserData) -> bool {
        match self {
            OnboardingStep::PhoneType => data.has_selected_phone_type(),
            OnboardingStep::SecureStorage => data.storage_setup_dismissed,
            OnboardingStep::AppleDriver => data.driver_installed,
            OnboardingStep::EmailConnect => data.has_completed_email_onboarding(),
            OnboardingStep::Permissions => data.permissions_granted,
            OnboardingStep::AndroidComingSoon => false,
        }
    }

    /// Informational steps never hold back readiness.
    pub fn gates_readiness(&self) -> bool {
        !matches!(self, OnboardingStep::AndroidComingSoon)
    }

    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            OnboardingStep::AppleDriver
                | OnboardingStep::EmailConnect
                | OnboardingStep::AndroidComingSoon
        )
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
