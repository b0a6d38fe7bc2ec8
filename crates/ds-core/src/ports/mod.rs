//! Port interfaces for the application layer
//!
//! Ports define the contract between the coordination logic and the external
//! collaborators it observes (storage, database, auth provider, user-data
//! repository, platform, feature-flag store). Implementations live in the
//! infrastructure and platform crates.
//!
//! Ports return `anyhow::Result`; the loading orchestrator maps failures onto
//! the error code of the phase that issued the probe.

pub mod app_dirs;
pub mod auth;
mod database;
pub mod errors;
mod feature_flag;
mod platform;
mod storage;
mod user_data;

pub use app_dirs::AppDirsPort;
pub use auth::{AuthPort, AuthSession, AuthorizationPort};
pub use database::DatabasePort;
pub use errors::AppDirsError;
pub use feature_flag::{FeatureFlagStorePort, USE_STATE_MACHINE_FLAG};
pub use platform::PlatformProbePort;
pub use storage::StorageProbePort;
pub use user_data::UserDataPort;
