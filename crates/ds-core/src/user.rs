//! User identity, session and persisted onboarding flags.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::platform::{PhoneType, Platform};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn from_str(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn inner(&self) -> &String {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Authenticated user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl User {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Authenticated user together with the platform the session runs on.
///
/// Carried inside the state variants once authentication has produced it, so
/// later phases (and the fresh-login path) never need to re-read it from the
/// triggering action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub platform: Platform,
}

impl Session {
    pub fn new(user: User, platform: Platform) -> Self {
        Self { user, platform }
    }
}

/// Onboarding completion flags loaded from the user-data repository.
///
/// Every field defaults when absent: a missing `phone_type` means "not yet
/// selected", missing booleans mean "not done".
///
/// 用户数据中的引导完成标记。缺失字段一律视为"未完成"。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserData {
    pub phone_type: Option<PhoneType>,
    pub storage_setup_dismissed: bool,
    /// Email onboarding was finished, either by connecting or by skipping.
    pub email_onboarding_completed: bool,
    pub email_connected: bool,
    pub permissions_granted: bool,
    pub driver_installed: bool,
}

impl UserData {
    pub fn has_selected_phone_type(&self) -> bool {
        self.phone_type.is_some()
    }

    pub fn has_completed_email_onboarding(&self) -> bool {
        self.email_onboarding_completed || self.email_connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_data_defaults_missing_fields() {
        let data: UserData = serde_json::from_str(r#"{"email_connected": true}"#).unwrap();

        assert_eq!(data.phone_type, None);
        assert!(data.email_connected);
        assert!(!data.permissions_granted);
        assert!(data.has_completed_email_onboarding());
    }

    #[test]
    fn user_data_parses_phone_type() {
        let data: UserData = serde_json::from_str(r#"{"phone_type": "android"}"#).unwrap();
        assert_eq!(data.phone_type, Some(PhoneType::Android));
        assert!(data.has_selected_phone_type());
    }

    #[test]
    fn user_data_tolerates_null_phone_type() {
        let data: UserData = serde_json::from_str(r#"{"phone_type": null}"#).unwrap();
        assert!(!data.has_selected_phone_type());
    }
}
