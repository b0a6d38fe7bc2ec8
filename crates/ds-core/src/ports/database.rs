use async_trait::async_trait;

/// Encrypted local database service.
#[async_trait]
pub trait DatabasePort: Send + Sync {
    /// Open the database and apply pending migrations.
    ///
    /// Must be idempotent: a retry after failure calls it again.
    async fn initialize(&self) -> anyhow::Result<()>;
}
