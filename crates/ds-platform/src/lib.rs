//! # ds-platform
//!
//! Platform-specific implementations that talk to the operating system:
//! OS identification and the per-user application directories.

pub mod app_dirs;
pub mod platform_probe;

pub use app_dirs::DirsAppDirsAdapter;
pub use platform_probe::SystemPlatformProbe;
