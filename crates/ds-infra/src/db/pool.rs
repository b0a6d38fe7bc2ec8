use std::path::Path;

use anyhow::{Context, Result};
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

/// Embed all diesel migrations at compile time
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Type alias for SQLite connection pool
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Create database connection pool and run migrations.
///
/// Blocking. Creates the parent directory of `database_path` when missing.
pub fn init_db_pool(database_path: &Path) -> Result<DbPool> {
    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create database dir failed: {}", parent.display()))?;
    }

    let manager = ConnectionManager::<SqliteConnection>::new(database_path.to_string_lossy());
    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .context("failed to create database pool")?;

    run_migrations(&pool)?;

    Ok(pool)
}

fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get().context("failed to get database connection")?;

    info!("Running database migrations...");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    info!("Database migrations completed");

    Ok(())
}
