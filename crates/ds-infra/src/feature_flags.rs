//! Persisted boolean feature flags.
//!
//! Read synchronously at boot, before the async runtime drives anything.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;

use ds_core::ports::FeatureFlagStorePort;

pub const DEFAULT_FEATURE_FLAGS_FILE: &str = "feature_flags.json";

type Flags = BTreeMap<String, bool>;

pub struct FileFeatureFlagRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileFeatureFlagRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_defaults(base_dir: PathBuf) -> Self {
        Self::new(base_dir.join(DEFAULT_FEATURE_FLAGS_FILE))
    }

    fn read_all(&self) -> anyhow::Result<Flags> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Flags::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("read feature flags failed: {}", self.path.display()))
            }
        };
        if content.trim().is_empty() {
            return Ok(Flags::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("parse feature flags failed: {}", self.path.display()))
    }
}

impl FeatureFlagStorePort for FileFeatureFlagRepository {
    fn read_flag(&self, key: &str) -> anyhow::Result<Option<bool>> {
        Ok(self.read_all()?.get(key).copied())
    }

    fn write_flag(&self, key: &str, value: bool) -> anyhow::Result<()> {
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut flags = self.read_all()?;
        flags.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&flags).context("serialize feature flags failed")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write feature flags failed: {}", self.path.display()))
    }
}
