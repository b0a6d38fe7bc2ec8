use std::future::Future;
use std::time::Duration;

use ds_core::error::{AppError, ErrorCode};

/// Race a network-bound operation against an explicit deadline.
///
/// Expiry maps to `ErrorCode::Timeout`; any other failure maps to `code`.
pub async fn with_timeout<T, F>(
    operation: &str,
    duration: Duration,
    code: ErrorCode,
    fut: F,
) -> Result<T, AppError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(AppError::new(code, format!("{operation} failed: {err:#}"))),
        Err(_elapsed) => Err(AppError::timeout(operation, duration)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn elapsed_deadline_yields_timeout_code() {
        let result: Result<(), AppError> = with_timeout(
            "authorization",
            Duration::from_secs(120),
            ErrorCode::AuthLoadError,
            async {
                tokio::time::sleep(Duration::from_secs(600)).await;
                Ok(())
            },
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.code, ErrorCode::Timeout);
    }

    #[tokio::test]
    async fn failure_maps_to_given_code() {
        let result: Result<(), AppError> = with_timeout(
            "profile load",
            Duration::from_secs(5),
            ErrorCode::UserDataLoadError,
            async { Err(anyhow::anyhow!("connection refused")) },
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserDataLoadError);
        assert!(err.message.contains("connection refused"));
    }
}
