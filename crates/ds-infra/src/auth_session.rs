//! File-based auth session repository
//!
//! Persists the signed-in session as a JSON file in the application data
//! directory. A missing or empty file means "signed out".

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs;

use ds_core::ports::{AuthPort, AuthSession};

pub const DEFAULT_SESSION_FILE: &str = "session.json";

pub struct FileAuthSessionRepository {
    session_file_path: PathBuf,
}

impl FileAuthSessionRepository {
    /// Create repository with custom file path
    pub fn new(session_file_path: impl Into<PathBuf>) -> Self {
        Self {
            session_file_path: session_file_path.into(),
        }
    }

    /// Create repository with defaults
    pub fn with_defaults(base_dir: PathBuf) -> Self {
        Self::new(base_dir.join(DEFAULT_SESSION_FILE))
    }

    async fn ensure_parent_dir(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.session_file_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl AuthPort for FileAuthSessionRepository {
    async fn load_session(&self) -> anyhow::Result<Option<AuthSession>> {
        if !self.session_file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.session_file_path).await?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let session: AuthSession = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse auth session: {e}"))?;

        Ok(Some(session))
    }

    async fn save_session(&self, session: &AuthSession) -> anyhow::Result<()> {
        self.ensure_parent_dir().await?;

        let json = serde_json::to_string_pretty(session)
            .map_err(|e| anyhow::anyhow!("Failed to serialize auth session: {e}"))?;

        let tmp = self.session_file_path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write session file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.session_file_path)
            .await
            .context("Failed to replace session file")?;

        Ok(())
    }

    async fn clear_session(&self) -> anyhow::Result<()> {
        if self.session_file_path.exists() {
            fs::remove_file(&self.session_file_path)
                .await
                .context("Failed to remove session file")?;
        }
        Ok(())
    }
}
