pub mod pool;
mod service;

pub use pool::{init_db_pool, DbPool};
pub use service::DieselDatabaseService;
