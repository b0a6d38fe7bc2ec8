//! # ds-core
//!
//! Core domain models for the application state coordination layer.
//!
//! This crate contains pure state-machine logic without any infrastructure
//! dependencies: the `AppState` tagged union, the reducer, onboarding step
//! rules, derivation functions and selectors. Side effects live behind the
//! traits in [`ports`].

pub mod app_dirs;
pub mod config;
pub mod derive;
pub mod error;
pub mod onboarding;
pub mod platform;
pub mod ports;
pub mod selectors;
pub mod state;
pub mod user;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use derive::{NavigationParams, NavigationTarget, Screen};
pub use error::{AppError, ErrorCode};
pub use onboarding::OnboardingStep;
pub use platform::{PhoneType, Platform};
pub use state::{Action, AppState, AppStateMachine, LoadingPhase};
pub use user::{Session, User, UserData, UserId};
