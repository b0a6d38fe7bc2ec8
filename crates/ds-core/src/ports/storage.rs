use async_trait::async_trait;

/// Presence check for the local secure key-store.
#[async_trait]
pub trait StorageProbePort: Send + Sync {
    /// Whether a key-store already exists on this machine.
    async fn has_key_store(&self) -> anyhow::Result<bool>;
}
