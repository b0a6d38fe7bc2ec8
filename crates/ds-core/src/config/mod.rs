pub mod app_config;

pub use app_config::{AppConfig, DEFAULT_NETWORK_TIMEOUT_SECS};
