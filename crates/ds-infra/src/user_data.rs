//! File-based user-data repository
//!
//! All profiles live in one JSON object keyed by user id. Missing fields in a
//! stored profile fall back to "not done".

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use ds_core::ports::UserDataPort;
use ds_core::user::{UserData, UserId};

pub const DEFAULT_USER_DATA_FILE: &str = "user_data.json";

type Profiles = HashMap<UserId, UserData>;

pub struct FileUserDataRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileUserDataRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_defaults(base_dir: PathBuf) -> Self {
        Self::new(base_dir.join(DEFAULT_USER_DATA_FILE))
    }

    async fn read_all(&self) -> anyhow::Result<Profiles> {
        if !self.path.exists() {
            return Ok(Profiles::new());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("read user data failed: {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Profiles::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("parse user data failed: {}", self.path.display()))
    }

    async fn write_all(&self, profiles: &Profiles) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(profiles).context("serialize user data failed")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .with_context(|| format!("write user data failed: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .context("replace user data file failed")?;
        Ok(())
    }
}

#[async_trait]
impl UserDataPort for FileUserDataRepository {
    async fn load(&self, user: &UserId) -> anyhow::Result<UserData> {
        let mut profiles = self.read_all().await?;
        match profiles.remove(user) {
            Some(data) => Ok(data),
            None => {
                debug!(%user, "no stored user data, using defaults");
                Ok(UserData::default())
            }
        }
    }

    async fn save(&self, user: &UserId, data: &UserData) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut profiles = self.read_all().await?;
        profiles.insert(user.clone(), data.clone());
        self.write_all(&profiles).await
    }
}
