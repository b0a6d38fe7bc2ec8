use crate::platform::Platform;

/// Synchronous operating-system identification.
pub trait PlatformProbePort: Send + Sync {
    fn detect(&self) -> Platform;
}
