use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Error from backend: HTTP {status}: {body}")]
    BackendError { status: u16, body: String },

    #[error("Request to job server failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration for {key}: {reason}")]
    Config { key: &'static str, reason: String },
}
