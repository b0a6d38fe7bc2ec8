//! Startup loading orchestration.

mod orchestrator;

pub use orchestrator::{LoadingOrchestrator, LoadingPorts, OrchestratorError, ProbeToken};
