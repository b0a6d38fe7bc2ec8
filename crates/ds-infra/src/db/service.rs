use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, info_span};

use ds_core::ports::DatabasePort;

use super::pool::{init_db_pool, DbPool};

/// Local SQLite database opened through a Diesel r2d2 pool.
///
/// `initialize` is idempotent: once the pool exists later calls return
/// immediately, and a failed attempt leaves nothing behind so a retry starts
/// over.
pub struct DieselDatabaseService {
    database_path: PathBuf,
    pool: Arc<OnceLock<DbPool>>,
}

impl DieselDatabaseService {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            pool: Arc::new(OnceLock::new()),
        }
    }

    /// Pool, once initialized.
    pub fn pool(&self) -> Option<DbPool> {
        self.pool.get().cloned()
    }
}

#[async_trait]
impl DatabasePort for DieselDatabaseService {
    async fn initialize(&self) -> anyhow::Result<()> {
        if self.pool.get().is_some() {
            debug!("database already initialized");
            return Ok(());
        }

        let path = self.database_path.clone();
        let slot = Arc::clone(&self.pool);
        tokio::task::spawn_blocking(move || {
            let _span = info_span!("infra.db.initialize", path = %path.display()).entered();
            let pool = init_db_pool(&path)?;
            let _ = slot.set(pool);
            Ok::<_, anyhow::Error>(())
        })
        .await
        .context("database initialization task failed")??;

        Ok(())
    }
}
