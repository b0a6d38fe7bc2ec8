pub mod loading;
pub mod login;
mod timeout;

pub use loading::{LoadingOrchestrator, LoadingPorts, OrchestratorError, ProbeToken};
pub use login::{LoginError, LoginFlow};
pub use timeout::with_timeout;
