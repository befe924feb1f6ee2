//! HTTP request handlers.

/// Account endpoints and bearer-token helpers.
pub mod auth;
/// Project endpoints.
pub mod project;

use crate::{error::HttpError, AppError};
use cipherstudio_core::constants::BACKEND_BANNER;

/// Plain-text banner served at `/`; doubles as a health check.
pub async fn root() -> &'static str {
    BACKEND_BANNER
}

/// Run CPU-heavy work (password hashing) off the async executor.
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T, HttpError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => result.map_err(HttpError::from),
        Err(err) => {
            tracing::error!("Blocking task failed: {}", err);
            Err(AppError::Internal.into())
        }
    }
}
