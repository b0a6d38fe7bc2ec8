use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Desktop operating system the client is running on.
///
/// 客户端所在的桌面操作系统。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[serde(rename = "macos")]
    MacOS,
    Windows,
    Linux,
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::MacOS => "macos",
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Unknown => "unknown",
        }
    }

    pub fn is_macos(&self) -> bool {
        matches!(self, Platform::MacOS)
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Windows)
    }
}

impl FromStr for Platform {
    type Err = ();

    /// Exact-match parsing of canonical platform identifiers.
    ///
    /// Unrecognized values map to `Unknown`; fuzzy matching of free-form
    /// platform or user-agent strings belongs to the platform probe.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "macos" | "darwin" => Ok(Platform::MacOS),
            "windows" | "win32" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            _ => Ok(Platform::Unknown),
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Phone the user pairs with the desktop client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhoneType {
    #[serde(rename = "iphone")]
    IPhone,
    #[serde(rename = "android")]
    Android,
}

impl PhoneType {
    pub const ALL: [PhoneType; 2] = [PhoneType::IPhone, PhoneType::Android];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhoneType::IPhone => "iphone",
            PhoneType::Android => "android",
        }
    }
}

impl FromStr for PhoneType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iphone" => Ok(PhoneType::IPhone),
            "android" => Ok(PhoneType::Android),
            other => Err(format!("unknown phone type: {other}")),
        }
    }
}

impl Display for PhoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_from_str_maps_unrecognized_to_unknown() {
        assert_eq!("macos".parse::<Platform>(), Ok(Platform::MacOS));
        assert_eq!("win32".parse::<Platform>(), Ok(Platform::Windows));
        assert_eq!("beos".parse::<Platform>(), Ok(Platform::Unknown));
    }

    #[test]
    fn platform_serializes_as_lowercase_identifier() {
        let json = serde_json::to_string(&Platform::MacOS).unwrap();
        assert_eq!(json, "\"macos\"");
        let json = serde_json::to_string(&Platform::Windows).unwrap();
        assert_eq!(json, "\"windows\"");
    }

    #[test]
    fn phone_type_rejects_unknown_values() {
        assert_eq!("iphone".parse::<PhoneType>(), Ok(PhoneType::IPhone));
        assert!("pager".parse::<PhoneType>().is_err());
    }
}
