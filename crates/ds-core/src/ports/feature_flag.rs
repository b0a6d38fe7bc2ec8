/// Key of the flag that selects the state-machine implementation.
pub const USE_STATE_MACHINE_FLAG: &str = "use_state_machine";

/// Persisted local key/value store for boolean feature flags.
///
/// Read synchronously, once, at boot.
pub trait FeatureFlagStorePort: Send + Sync {
    /// `None` when the flag was never written.
    fn read_flag(&self, key: &str) -> anyhow::Result<Option<bool>>;

    /// Persist a flag value. Takes effect on the next start.
    fn write_flag(&self, key: &str, value: bool) -> anyhow::Result<()>;
}
