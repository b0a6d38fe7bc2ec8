//! Operating-system identification.
//!
//! Detection falls back through three sources, most trusted first:
//!
//! 1. The native value compiled into the binary (`std::env::consts::OS`)
//! 2. A generic platform string (`OSTYPE`), matched by substring
//! 3. A user-agent string (`DS_USER_AGENT`), matched by substring
//!
//! When all three are inconclusive the probe reports `Platform::Unknown`,
//! under which no platform-specific onboarding step is shown.

use std::sync::OnceLock;

use tracing::{debug, warn};

use ds_core::{ports::PlatformProbePort, Platform};

pub const PLATFORM_STRING_ENV: &str = "OSTYPE";
pub const USER_AGENT_ENV: &str = "DS_USER_AGENT";

pub struct SystemPlatformProbe {
    native: Option<String>,
    platform_string: Option<String>,
    user_agent: Option<String>,
    detected: OnceLock<Platform>,
}

impl SystemPlatformProbe {
    pub fn new() -> Self {
        Self::from_sources(
            Some(std::env::consts::OS.to_string()),
            std::env::var(PLATFORM_STRING_ENV).ok(),
            std::env::var(USER_AGENT_ENV).ok(),
        )
    }

    pub fn from_sources(
        native: Option<String>,
        platform_string: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            native,
            platform_string,
            user_agent,
            detected: OnceLock::new(),
        }
    }

    fn resolve(&self) -> Platform {
        if let Some(platform) = self.native.as_deref().and_then(from_native) {
            debug!(%platform, source = "native", "platform detected");
            return platform;
        }
        if let Some(platform) = self.platform_string.as_deref().and_then(from_platform_string) {
            debug!(%platform, source = "platform-string", "platform detected");
            return platform;
        }
        if let Some(platform) = self.user_agent.as_deref().and_then(from_user_agent) {
            debug!(%platform, source = "user-agent", "platform detected");
            return platform;
        }

        warn!(
            native = ?self.native,
            platform_string = ?self.platform_string,
            user_agent = ?self.user_agent,
            "platform detection exhausted all sources, assuming unknown"
        );
        Platform::Unknown
    }
}

impl Default for SystemPlatformProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformProbePort for SystemPlatformProbe {
    fn detect(&self) -> Platform {
        *self.detected.get_or_init(|| self.resolve())
    }
}

fn known(platform: Platform) -> Option<Platform> {
    (platform != Platform::Unknown).then_some(platform)
}

fn from_native(value: &str) -> Option<Platform> {
    value.parse::<Platform>().ok().and_then(known)
}

fn from_platform_string(value: &str) -> Option<Platform> {
    let value = value.to_ascii_lowercase();
    // "darwin" contains "win"
    if value.contains("darwin") || value.contains("mac") {
        Some(Platform::MacOS)
    } else if value.contains("win") || value.contains("msys") || value.contains("cygwin") {
        Some(Platform::Windows)
    } else if value.contains("linux") {
        Some(Platform::Linux)
    } else {
        None
    }
}

fn from_user_agent(value: &str) -> Option<Platform> {
    let value = value.to_ascii_lowercase();
    if value.contains("macintosh") || value.contains("mac os") {
        Some(Platform::MacOS)
    } else if value.contains("windows") {
        Some(Platform::Windows)
    } else if value.contains("linux") || value.contains("x11") {
        Some(Platform::Linux)
    } else {
        None
    }
}
