//! Application state domain module.
//!
//! This module defines the application state tagged union, the actions that
//! drive it, and the pure reducer.

mod action;
pub mod machine;
mod state;

pub use action::Action;
pub use machine::{reduce, AppStateMachine};
pub use state::{AppState, LoadingPhase};
