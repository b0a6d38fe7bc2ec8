//! State-machine rollout flag.
//!
//! The flag is resolved once per process and never re-read: flipping the
//! persisted value takes effect on the next start.

use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use ds_core::ports::{FeatureFlagStorePort, USE_STATE_MACHINE_FLAG};

/// Value used when neither an override nor a persisted value exists.
pub const DEFAULT_USE_STATE_MACHINE: bool = true;

/// Environment variable carrying the one-shot runtime override.
pub const STATE_MACHINE_ENV: &str = "DS_STATE_MACHINE";

static PROCESS_FLAG: OnceLock<bool> = OnceLock::new();

/// Parse an override string such as `true`, `0`, `on`.
pub fn parse_override(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Override from [`STATE_MACHINE_ENV`], if set to a recognizable boolean.
pub fn read_env_override() -> Option<bool> {
    let raw = std::env::var(STATE_MACHINE_ENV).ok()?;
    let parsed = parse_override(&raw);
    if parsed.is_none() {
        warn!(value = %raw, "ignoring unparseable {}", STATE_MACHINE_ENV);
    }
    parsed
}

/// Boot-time resolution of `use_state_machine`.
pub struct FeatureFlagGate {
    store: Arc<dyn FeatureFlagStorePort>,
    runtime_override: Option<bool>,
    resolved: OnceLock<bool>,
}

impl FeatureFlagGate {
    pub fn new(store: Arc<dyn FeatureFlagStorePort>) -> Self {
        Self {
            store,
            runtime_override: None,
            resolved: OnceLock::new(),
        }
    }

    /// Override the persisted value for this process only.
    pub fn with_override(mut self, value: Option<bool>) -> Self {
        self.runtime_override = value;
        self
    }

    /// Whether consumers should derive from the new state machine.
    pub fn use_state_machine(&self) -> bool {
        *self.resolved.get_or_init(|| self.resolve())
    }

    /// Persist a new value. The running process keeps its resolved value.
    pub fn persist(&self, value: bool) -> anyhow::Result<()> {
        self.store.write_flag(USE_STATE_MACHINE_FLAG, value)?;
        info!(value, "state machine flag persisted, restart to apply");
        Ok(())
    }

    fn resolve(&self) -> bool {
        if let Some(value) = self.runtime_override {
            info!(value, source = "override", "state machine flag resolved");
            return value;
        }
        match self.store.read_flag(USE_STATE_MACHINE_FLAG) {
            Ok(Some(value)) => {
                info!(value, source = "store", "state machine flag resolved");
                value
            }
            Ok(None) => {
                info!(
                    value = DEFAULT_USE_STATE_MACHINE,
                    source = "default",
                    "state machine flag resolved"
                );
                DEFAULT_USE_STATE_MACHINE
            }
            Err(err) => {
                warn!(
                    error = %err,
                    value = DEFAULT_USE_STATE_MACHINE,
                    "failed to read state machine flag, using default"
                );
                DEFAULT_USE_STATE_MACHINE
            }
        }
    }
}

/// Publish the gate's value as the process-wide flag.
///
/// The first call wins; later calls return the already published value.
pub fn init_process_flag(gate: &FeatureFlagGate) -> bool {
    *PROCESS_FLAG.get_or_init(|| gate.use_state_machine())
}

/// Process-wide flag accessor. Falls back to the default before bootstrap.
pub fn state_machine_enabled() -> bool {
    PROCESS_FLAG
        .get()
        .copied()
        .unwrap_or(DEFAULT_USE_STATE_MACHINE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MemoryFlags {
        value: Mutex<Option<bool>>,
        reads: AtomicUsize,
        fail: bool,
    }

    impl MemoryFlags {
        fn new(value: Option<bool>) -> Self {
            Self {
                value: Mutex::new(value),
                reads: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(None)
            }
        }
    }

    impl FeatureFlagStorePort for MemoryFlags {
        fn read_flag(&self, _key: &str) -> anyhow::Result<Option<bool>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("flag file corrupted");
            }
            Ok(*self.value.lock().unwrap())
        }

        fn write_flag(&self, _key: &str, value: bool) -> anyhow::Result<()> {
            *self.value.lock().unwrap() = Some(value);
            Ok(())
        }
    }

    #[test]
    fn defaults_to_enabled_when_nothing_persisted() {
        let gate = FeatureFlagGate::new(Arc::new(MemoryFlags::new(None)));
        assert!(gate.use_state_machine());
    }

    #[test]
    fn persisted_value_is_used() {
        let gate = FeatureFlagGate::new(Arc::new(MemoryFlags::new(Some(false))));
        assert!(!gate.use_state_machine());
    }

    #[test]
    fn override_wins_over_persisted_value() {
        let gate = FeatureFlagGate::new(Arc::new(MemoryFlags::new(Some(false))))
            .with_override(Some(true));
        assert!(gate.use_state_machine());
    }

    #[test]
    fn read_failure_falls_back_to_default() {
        let gate = FeatureFlagGate::new(Arc::new(MemoryFlags::failing()));
        assert_eq!(gate.use_state_machine(), DEFAULT_USE_STATE_MACHINE);
    }

    #[test]
    fn flag_is_read_once_and_persist_needs_restart() {
        let flags = Arc::new(MemoryFlags::new(Some(true)));
        let gate = FeatureFlagGate::new(flags.clone());

        assert!(gate.use_state_machine());
        gate.persist(false).unwrap();
        assert!(gate.use_state_machine());
        assert_eq!(flags.reads.load(Ordering::SeqCst), 1);

        let restarted = FeatureFlagGate::new(flags);
        assert!(!restarted.use_state_machine());
    }

    #[test]
    fn process_flag_is_published_once() {
        let first = FeatureFlagGate::new(Arc::new(MemoryFlags::new(Some(false))));
        let second = FeatureFlagGate::new(Arc::new(MemoryFlags::new(Some(true))));

        assert!(!init_process_flag(&first));
        assert!(!init_process_flag(&second));
        assert!(!state_machine_enabled());
        // the gate itself still reports its own value
        assert!(second.use_state_machine());
    }

    #[test]
    fn parse_override_accepts_common_spellings() {
        assert_eq!(parse_override("true"), Some(true));
        assert_eq!(parse_override(" ON "), Some(true));
        assert_eq!(parse_override("0"), Some(false));
        assert_eq!(parse_override("no"), Some(false));
        assert_eq!(parse_override("maybe"), None);
    }
}
