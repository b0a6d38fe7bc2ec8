//! Application orchestration layer
//!
//! This crate owns the single-writer state store, drives the startup probes,
//! resolves the state-machine feature flag and hosts the migration adapters
//! that keep legacy call sites working during the switch-over.

pub mod feature_flag;
pub mod migration;
pub mod store;
pub mod usecases;

pub use feature_flag::FeatureFlagGate;
pub use store::{DispatchOutcome, StateStore, TransitionRecord};
pub use usecases::{LoadingOrchestrator, LoadingPorts, LoginFlow, OrchestratorError};
