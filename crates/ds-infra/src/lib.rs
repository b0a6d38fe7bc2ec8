pub mod auth_session;
pub mod db;
pub mod feature_flags;
pub mod key_store;
pub mod user_data;

pub use auth_session::FileAuthSessionRepository;
pub use db::DieselDatabaseService;
pub use feature_flags::FileFeatureFlagRepository;
pub use key_store::FileKeyStoreProbe;
pub use user_data::FileUserDataRepository;
