use async_trait::async_trait;

use crate::user::{UserData, UserId};

/// User-profile repository holding the onboarding completion flags.
#[async_trait]
pub trait UserDataPort: Send + Sync {
    /// Load the flags for `user`. Unknown users yield the default (nothing done).
    async fn load(&self, user: &UserId) -> anyhow::Result<UserData>;

    async fn save(&self, user: &UserId, data: &UserData) -> anyhow::Result<()>;
}
