use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::models::GatewayResponse;

/// Application-wide error types.
///
/// # Request Errors
///
/// `BodyRead` and `Publish` are per-request failures. Their `Display` text
/// is the exact message returned to the caller, so the prefix and the
/// underlying cause both reach the client.
///
/// # Startup Errors
///
/// `Config` only occurs before the listener is running and terminates the
/// process from `main`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Could not read body data {0}")]
    BodyRead(String),

    #[error("Could not send stream data {0}")]
    Publish(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");

        GatewayResponse::error(self.to_string()).into_response()
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
