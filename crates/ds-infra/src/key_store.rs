//! Secure key-store presence probe.

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs;

use ds_core::ports::StorageProbePort;

pub const DEFAULT_KEY_STORE_FILE: &str = "keystore/master.key";

/// Reports whether the key-store file exists and is non-empty.
pub struct FileKeyStoreProbe {
    path: PathBuf,
}

impl FileKeyStoreProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn with_defaults(base_dir: PathBuf) -> Self {
        Self::new(base_dir.join(DEFAULT_KEY_STORE_FILE))
    }
}

#[async_trait]
impl StorageProbePort for FileKeyStoreProbe {
    async fn has_key_store(&self) -> anyhow::Result<bool> {
        match fs::metadata(&self.path).await {
            Ok(meta) => Ok(meta.is_file() && meta.len() > 0),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err)
                .with_context(|| format!("stat key store failed: {}", self.path.display())),
        }
    }
}
