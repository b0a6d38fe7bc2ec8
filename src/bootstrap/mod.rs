pub mod config;
pub mod tracing;
pub mod wiring;

mod run;

pub use config::load_config;
pub use run::{execute, run};
pub use wiring::{resolve_config, wire_dependencies, AppRuntime};
