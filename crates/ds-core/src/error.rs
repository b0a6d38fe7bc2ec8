//! Error taxonomy surfaced through the `Error` state variant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable error code.
///
/// 错误码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    StorageError,
    DatabaseInitError,
    AuthLoadError,
    UserDataLoadError,
    Timeout,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::DatabaseInitError => "DATABASE_INIT_ERROR",
            ErrorCode::AuthLoadError => "AUTH_LOAD_ERROR",
            ErrorCode::UserDataLoadError => "USER_DATA_LOAD_ERROR",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error carried by `AppState::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn timeout(operation: &str, after: std::time::Duration) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!("{operation} timed out after {}s", after.as_secs()),
        )
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unknown, message)
    }

    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }
}
