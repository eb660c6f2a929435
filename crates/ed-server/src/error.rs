use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Image is not valid base64: {0}")]
    InvalidImage(#[from] base64::DecodeError),

    #[error("Invalid configuration for {key}: {reason}")]
    Config { key: &'static str, reason: String },
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::InvalidImage(_) => StatusCode::BAD_REQUEST,
            Self::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
