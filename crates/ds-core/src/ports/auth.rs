//! Auth provider ports.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::user::User;

/// Persisted authentication result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: User,
    #[serde(default)]
    pub is_new_user: bool,
}

/// Loads and stores the persisted session (token storage).
#[async_trait]
pub trait AuthPort: Send + Sync {
    /// Load the stored session; `None` when signed out.
    async fn load_session(&self) -> anyhow::Result<Option<AuthSession>>;

    async fn save_session(&self, session: &AuthSession) -> anyhow::Result<()>;

    async fn clear_session(&self) -> anyhow::Result<()>;
}

/// Interactive, network-bound authorization (browser sign-in, code exchange).
#[async_trait]
pub trait AuthorizationPort: Send + Sync {
    /// Acquire an authorization code and exchange it for a session.
    async fn authorize(&self) -> anyhow::Result<AuthSession>;
}
