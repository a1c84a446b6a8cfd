use reqwest::StatusCode;
use thiserror::Error;

/// OneSignal client error types
#[derive(Error, Debug)]
pub enum OneSignalError {
    /// Rejected locally before any network call
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure surfaced by the HTTP layer (connection, DNS, timeout)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response from the API; the body is kept as raw text
    #[error("OneSignal API error: {status} - {body}")]
    Remote { status: StatusCode, body: String },

    /// A detached request task panicked or was cancelled before settling
    #[error("detached request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
